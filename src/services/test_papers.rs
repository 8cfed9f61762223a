use std::collections::{HashMap, HashSet};

use sqlx::{PgPool, Postgres};
use time::PrimitiveDateTime;
use validator::Validate;

use crate::core::metrics;
use crate::core::time::primitive_now_utc;
use crate::db::is_unique_violation;
use crate::db::models::{PaperQuestion, Question, TestPaper, User};
use crate::repositories;
use crate::repositories::test_papers::{TestPaperFields, TestPaperSummaryRow};
use crate::schemas::test_paper::TestPaperPayload;
use crate::services::question_filter::{self, FilterOptions};
use crate::services::validation::{non_blank, trim_in_place};
use crate::services::{ensure_owner, page_window, FieldErrors, Page, ServiceError};

pub(crate) const TEST_PAPERS_PAGE_SIZE: i64 = 12;

/// Ordered, duplicate-free, non-empty list of question ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QuestionSelection(Vec<i64>);

impl QuestionSelection {
    pub(crate) fn new(ids: Vec<i64>) -> Result<Self, ServiceError> {
        if ids.is_empty() {
            return Err(ServiceError::validation(
                "question_ids",
                "At least one question must be selected.",
            ));
        }

        let mut seen = HashSet::with_capacity(ids.len());
        let mut duplicates = Vec::new();
        for id in &ids {
            if !seen.insert(*id) && !duplicates.contains(id) {
                duplicates.push(*id);
            }
        }
        if !duplicates.is_empty() {
            return Err(ServiceError::Conflict(format!(
                "Questions selected more than once: {}",
                join_ids(&duplicates)
            )));
        }

        Ok(Self(ids))
    }

    pub(crate) fn ids(&self) -> &[i64] {
        &self.0
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TestPaperDraft {
    pub(crate) title: String,
    pub(crate) grade_level: String,
    pub(crate) subject: String,
    pub(crate) duration_minutes: Option<i32>,
    pub(crate) instructions: Option<String>,
    pub(crate) selection: QuestionSelection,
}

impl TestPaperDraft {
    pub(crate) fn from_payload(mut payload: TestPaperPayload) -> Result<Self, ServiceError> {
        trim_in_place(&mut payload.title);
        trim_in_place(&mut payload.grade_level);
        trim_in_place(&mut payload.subject);
        payload.instructions = non_blank(payload.instructions.take());

        if let Err(errors) = payload.validate() {
            return Err(ServiceError::Validation(FieldErrors::from(errors)));
        }

        Ok(Self {
            title: payload.title,
            grade_level: payload.grade_level,
            subject: payload.subject,
            duration_minutes: payload.duration_minutes,
            instructions: payload.instructions,
            selection: QuestionSelection::new(payload.question_ids)?,
        })
    }

    fn fields(&self) -> TestPaperFields<'_> {
        TestPaperFields {
            title: &self.title,
            grade_level: &self.grade_level,
            subject: &self.subject,
            duration_minutes: self.duration_minutes,
            instructions: self.instructions.as_deref(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct TestPaperDetail {
    pub(crate) paper: TestPaper,
    pub(crate) questions: Vec<PaperQuestion>,
}

#[derive(Debug)]
pub(crate) struct QuestionPicker {
    pub(crate) groups: Vec<(String, Vec<Question>)>,
    pub(crate) filter_options: FilterOptions,
}

pub(crate) async fn create(
    db: &PgPool,
    owner: &User,
    draft: &TestPaperDraft,
) -> Result<TestPaperDetail, ServiceError> {
    let now = primitive_now_utc();
    let mut tx = db.begin().await?;

    ensure_selectable(&mut tx, owner, &draft.selection).await?;

    let paper = repositories::test_papers::create(&mut *tx, &owner.id, draft.fields(), now).await?;
    let detail = attach_and_total(&mut tx, paper.id, &draft.selection, now).await?;

    tx.commit().await?;

    metrics::record_test_paper_mutation("create", draft.selection.len());
    tracing::info!(
        owner_id = %owner.id,
        test_paper_id = detail.paper.id,
        question_count = draft.selection.len(),
        total_points = detail.paper.total_points,
        "Test paper created"
    );

    Ok(detail)
}

/// Replaces the details and the whole question set of a paper in one transaction.
pub(crate) async fn update(
    db: &PgPool,
    actor: &User,
    id: i64,
    draft: &TestPaperDraft,
) -> Result<TestPaperDetail, ServiceError> {
    let now = primitive_now_utc();
    let mut tx = db.begin().await?;

    let existing = repositories::test_papers::find_by_id_for_update(&mut tx, id)
        .await?
        .ok_or_else(not_found)?;
    ensure_owner(actor, &existing.user_id)?;
    ensure_selectable(&mut tx, actor, &draft.selection).await?;

    repositories::test_papers::update_details(&mut *tx, id, draft.fields(), now).await?;
    let detail = attach_and_total(&mut tx, id, &draft.selection, now).await?;

    tx.commit().await?;

    metrics::record_test_paper_mutation("update", draft.selection.len());
    tracing::info!(
        owner_id = %actor.id,
        test_paper_id = id,
        question_count = draft.selection.len(),
        total_points = detail.paper.total_points,
        "Test paper updated"
    );

    Ok(detail)
}

pub(crate) async fn destroy(db: &PgPool, actor: &User, id: i64) -> Result<(), ServiceError> {
    let existing = repositories::test_papers::find_by_id(db, id).await?.ok_or_else(not_found)?;
    ensure_owner(actor, &existing.user_id)?;

    repositories::test_papers::delete(db, id).await?;

    metrics::record_test_paper_mutation("delete", 0);
    tracing::info!(owner_id = %actor.id, test_paper_id = id, "Test paper deleted");

    Ok(())
}

pub(crate) async fn show(db: &PgPool, actor: &User, id: i64) -> Result<TestPaperDetail, ServiceError> {
    let paper = repositories::test_papers::find_by_id(db, id).await?.ok_or_else(not_found)?;
    ensure_owner(actor, &paper.user_id)?;

    let questions = repositories::test_papers::list_questions(db, id).await?;
    Ok(TestPaperDetail { paper, questions })
}

pub(crate) async fn list(
    db: &PgPool,
    owner: &User,
    requested_page: Option<i64>,
) -> Result<Page<TestPaperSummaryRow>, ServiceError> {
    let (page, offset) = page_window(requested_page, TEST_PAPERS_PAGE_SIZE);

    let total_count = repositories::test_papers::count_for_owner(db, &owner.id).await?;
    let items = if offset < total_count {
        repositories::test_papers::list_for_owner(db, &owner.id, offset, TEST_PAPERS_PAGE_SIZE)
            .await?
    } else {
        Vec::new()
    };

    Ok(Page { items, page, page_size: TEST_PAPERS_PAGE_SIZE, total_count })
}

/// The owner's questions grouped by textbook, newest first, for composing a paper.
pub(crate) async fn question_picker(db: &PgPool, owner: &User) -> Result<QuestionPicker, ServiceError> {
    let questions = repositories::questions::list_for_owner(db, &owner.id).await?;
    let filter_options = question_filter::filter_options(db, owner).await?;

    Ok(QuestionPicker { groups: group_by_textbook(questions), filter_options })
}

/// Groups keep the order in which each textbook first appears.
fn group_by_textbook(questions: Vec<Question>) -> Vec<(String, Vec<Question>)> {
    let mut groups: Vec<(String, Vec<Question>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for question in questions {
        match index.get(&question.textbook) {
            Some(&position) => groups[position].1.push(question),
            None => {
                index.insert(question.textbook.clone(), groups.len());
                groups.push((question.textbook.clone(), vec![question]));
            }
        }
    }

    groups
}

/// Every selected id must name an existing question owned by `owner`.
async fn ensure_selectable(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    owner: &User,
    selection: &QuestionSelection,
) -> Result<(), ServiceError> {
    let found = repositories::questions::lock_owned_ids(tx, &owner.id, selection.ids())
        .await?
        .into_iter()
        .collect::<HashSet<_>>();

    let missing =
        selection.ids().iter().copied().filter(|id| !found.contains(id)).collect::<Vec<_>>();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!("Questions not found: {}", join_ids(&missing))))
    }
}

async fn attach_and_total(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    test_paper_id: i64,
    selection: &QuestionSelection,
    now: PrimitiveDateTime,
) -> Result<TestPaperDetail, ServiceError> {
    repositories::test_papers::replace_associations(tx, test_paper_id, selection.ids(), now)
        .await
        .map_err(conflict_on_unique)?;

    let paper = repositories::test_papers::recompute_total_points(&mut **tx, test_paper_id, now).await?;
    let questions = repositories::test_papers::list_questions(&mut **tx, test_paper_id).await?;

    Ok(TestPaperDetail { paper, questions })
}

fn conflict_on_unique(error: sqlx::Error) -> ServiceError {
    if is_unique_violation(&error) {
        ServiceError::Conflict("A question can appear only once in a test paper".to_string())
    } else {
        ServiceError::Database(error)
    }
}

fn not_found() -> ServiceError {
    ServiceError::NotFound("Test paper not found".to_string())
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter().map(i64::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::db::types::{DifficultyLevel, QuestionSource, QuestionType};

    fn question(id: i64, textbook: &str) -> Question {
        let now = primitive_now_utc();
        Question {
            id,
            user_id: "owner".to_string(),
            question_text: format!("Question {id}"),
            question_type: QuestionType::Descriptive,
            options: None,
            correct_answer: None,
            grade_level: "7".to_string(),
            textbook: textbook.to_string(),
            chapter: "1".to_string(),
            source: QuestionSource::Custom,
            difficulty_level: DifficultyLevel::Easy,
            points: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn selection_keeps_order() {
        let selection = QuestionSelection::new(vec![3, 1, 2]).expect("selection");
        assert_eq!(selection.ids(), &[3, 1, 2]);
        assert_eq!(selection.len(), 3);
    }

    #[test]
    fn empty_selection_is_a_validation_error() {
        let Err(ServiceError::Validation(errors)) = QuestionSelection::new(Vec::new()) else {
            panic!("expected validation error");
        };
        assert!(errors.get("question_ids").is_some());
    }

    #[test]
    fn duplicate_selection_is_a_conflict() {
        let Err(ServiceError::Conflict(message)) = QuestionSelection::new(vec![1, 2, 1, 1]) else {
            panic!("expected conflict");
        };
        assert_eq!(message, "Questions selected more than once: 1");
    }

    #[test]
    fn draft_reports_field_errors_before_selection_rules() {
        let payload: TestPaperPayload = serde_json::from_value(json!({
            "title": "  ",
            "grade_level": "7",
            "subject": "Math",
            "duration_minutes": 5,
            "question_ids": []
        }))
        .expect("payload");

        let Err(ServiceError::Validation(errors)) = TestPaperDraft::from_payload(payload) else {
            panic!("expected validation error");
        };
        assert!(errors.get("title").is_some());
        assert!(errors.get("duration_minutes").is_some());
        assert!(errors.get("question_ids").is_some());
    }

    #[test]
    fn draft_trims_and_drops_blank_instructions() {
        let payload: TestPaperPayload = serde_json::from_value(json!({
            "title": " Midterm ",
            "grade_level": "7",
            "subject": "Math",
            "instructions": "   ",
            "question_ids": [4, 2]
        }))
        .expect("payload");

        let draft = TestPaperDraft::from_payload(payload).expect("draft");
        assert_eq!(draft.title, "Midterm");
        assert_eq!(draft.instructions, None);
        assert_eq!(draft.duration_minutes, None);
        assert_eq!(draft.selection.ids(), &[4, 2]);
    }

    #[test]
    fn groups_follow_first_appearance() {
        let groups = group_by_textbook(vec![
            question(5, "Geometry"),
            question(4, "Algebra"),
            question(3, "Geometry"),
        ]);

        let summary = groups
            .iter()
            .map(|(textbook, items)| {
                (textbook.as_str(), items.iter().map(|item| item.id).collect::<Vec<_>>())
            })
            .collect::<Vec<_>>();
        assert_eq!(summary, vec![("Geometry", vec![5, 3]), ("Algebra", vec![4])]);
    }
}
