use sqlx::PgPool;
use validator::Validate;

use crate::core::metrics;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Question, User};
use crate::db::types::{DifficultyLevel, QuestionSource, QuestionType};
use crate::repositories;
use crate::repositories::questions::QuestionFields;
use crate::schemas::question::QuestionPayload;
use crate::services::question_options::{self, QuestionOptions};
use crate::services::validation::{non_blank, trim_in_place};
use crate::services::{ensure_owner, FieldErrors, ServiceError};

/// A fully validated question, ready to be written.
#[derive(Debug, Clone)]
pub(crate) struct QuestionDraft {
    pub(crate) question_text: String,
    pub(crate) question_type: QuestionType,
    pub(crate) options: Option<QuestionOptions>,
    pub(crate) correct_answer: Option<String>,
    pub(crate) grade_level: String,
    pub(crate) textbook: String,
    pub(crate) chapter: String,
    pub(crate) source: QuestionSource,
    pub(crate) difficulty_level: DifficultyLevel,
    pub(crate) points: i32,
}

impl QuestionDraft {
    /// Collects every field problem before failing, so callers see them all at once.
    pub(crate) fn from_payload(mut payload: QuestionPayload) -> Result<Self, ServiceError> {
        trim_in_place(&mut payload.question_text);
        trim_in_place(&mut payload.grade_level);
        trim_in_place(&mut payload.textbook);
        trim_in_place(&mut payload.chapter);
        payload.correct_answer = non_blank(payload.correct_answer.take());

        let mut errors = match payload.validate() {
            Ok(()) => FieldErrors::default(),
            Err(validation_errors) => FieldErrors::from(validation_errors),
        };

        let question_type = parse_enum::<QuestionType>(
            &mut errors,
            "question_type",
            &payload.question_type,
            "The selected question type is invalid.",
        );
        let source = parse_enum::<QuestionSource>(
            &mut errors,
            "source",
            &payload.source,
            "The selected source is invalid.",
        );
        let difficulty_level = parse_enum::<DifficultyLevel>(
            &mut errors,
            "difficulty_level",
            &payload.difficulty_level,
            "The selected difficulty level is invalid.",
        );

        let mut options = None;
        if let Some(kind) = question_type {
            match question_options::parse(kind, payload.options.as_ref()) {
                Ok(parsed) => {
                    if let Some(answer) = payload.correct_answer.as_deref() {
                        if let Err(message) =
                            question_options::check_correct_answer(kind, parsed.as_ref(), answer)
                        {
                            errors.add("correct_answer", message);
                        }
                    }
                    options = Some(parsed);
                }
                Err(message) => errors.add("options", message),
            }
        }

        match (question_type, source, difficulty_level, options) {
            (Some(question_type), Some(source), Some(difficulty_level), Some(options))
                if errors.is_empty() =>
            {
                Ok(Self {
                    question_text: payload.question_text,
                    question_type,
                    options,
                    correct_answer: payload.correct_answer,
                    grade_level: payload.grade_level,
                    textbook: payload.textbook,
                    chapter: payload.chapter,
                    source,
                    difficulty_level,
                    points: payload.points,
                })
            }
            _ => Err(ServiceError::Validation(errors)),
        }
    }

    fn fields(&self) -> QuestionFields<'_> {
        QuestionFields {
            question_text: &self.question_text,
            question_type: self.question_type,
            options: self.options.as_ref().map(QuestionOptions::to_json),
            correct_answer: self.correct_answer.as_deref(),
            grade_level: &self.grade_level,
            textbook: &self.textbook,
            chapter: &self.chapter,
            source: self.source,
            difficulty_level: self.difficulty_level,
            points: self.points,
        }
    }
}

fn parse_enum<T: std::str::FromStr>(
    errors: &mut FieldErrors,
    field: &str,
    raw: &str,
    invalid_message: &str,
) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add(field, format!("The {} field is required.", field.replace('_', " ")));
        return None;
    }
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.add(field, invalid_message);
            None
        }
    }
}

pub(crate) async fn create(
    db: &PgPool,
    owner: &User,
    draft: &QuestionDraft,
) -> Result<Question, ServiceError> {
    let question =
        repositories::questions::create(db, &owner.id, draft.fields(), primitive_now_utc()).await?;

    metrics::record_question_mutation("create");
    tracing::info!(
        owner_id = %owner.id,
        question_id = question.id,
        question_type = question.question_type.as_str(),
        "Question created"
    );

    Ok(question)
}

pub(crate) async fn show(db: &PgPool, actor: &User, id: i64) -> Result<Question, ServiceError> {
    let question = fetch(db, id).await?;
    ensure_owner(actor, &question.user_id)?;
    Ok(question)
}

/// Full replacement of every mutable field.
///
/// Papers that contain the question keep their stored `total_points`;
/// a points edit is not propagated.
pub(crate) async fn update(
    db: &PgPool,
    actor: &User,
    id: i64,
    draft: &QuestionDraft,
) -> Result<Question, ServiceError> {
    let mut tx = db.begin().await?;

    let existing = repositories::questions::find_by_id_for_update(&mut *tx, id)
        .await?
        .ok_or_else(not_found)?;
    ensure_owner(actor, &existing.user_id)?;

    let question =
        repositories::questions::update(&mut *tx, id, draft.fields(), primitive_now_utc())
            .await?
            .ok_or_else(not_found)?;

    tx.commit().await?;

    metrics::record_question_mutation("update");
    tracing::info!(owner_id = %actor.id, question_id = id, "Question updated");

    Ok(question)
}

/// Deletes the question, then closes the position gap and refreshes the total
/// of every paper that held it.
pub(crate) async fn destroy(db: &PgPool, actor: &User, id: i64) -> Result<(), ServiceError> {
    let mut tx = db.begin().await?;

    let existing = repositories::questions::find_by_id_for_update(&mut *tx, id)
        .await?
        .ok_or_else(not_found)?;
    ensure_owner(actor, &existing.user_id)?;

    let affected_papers =
        repositories::test_papers::list_ids_containing_question(&mut tx, id).await?;
    repositories::questions::delete(&mut *tx, id).await?;

    let now = primitive_now_utc();
    for test_paper_id in &affected_papers {
        repositories::test_papers::renumber_positions(&mut *tx, *test_paper_id).await?;
        repositories::test_papers::recompute_total_points(&mut *tx, *test_paper_id, now).await?;
    }

    tx.commit().await?;

    metrics::record_question_mutation("delete");
    tracing::info!(
        owner_id = %actor.id,
        question_id = id,
        affected_papers = affected_papers.len(),
        "Question deleted"
    );

    Ok(())
}

async fn fetch(db: &PgPool, id: i64) -> Result<Question, ServiceError> {
    repositories::questions::find_by_id(db, id).await?.ok_or_else(not_found)
}

fn not_found() -> ServiceError {
    ServiceError::NotFound("Question not found".to_string())
}
