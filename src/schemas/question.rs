use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{PaperQuestion, Question};
use crate::db::types::{DifficultyLevel, QuestionSource, QuestionType};

/// Body of `POST /questions` and `PUT /questions/:id`. Update replaces every field.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "The question text field is required."))]
    pub(crate) question_text: String,
    #[serde(default)]
    pub(crate) question_type: String,
    #[serde(default)]
    pub(crate) options: Option<Value>,
    #[serde(default)]
    #[validate(length(max = 255, message = "The correct answer may not exceed 255 characters."))]
    pub(crate) correct_answer: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "The grade level must be 1-50 characters."))]
    pub(crate) grade_level: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The textbook must be 1-255 characters."))]
    pub(crate) textbook: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The chapter must be 1-255 characters."))]
    pub(crate) chapter: String,
    #[serde(default)]
    pub(crate) source: String,
    #[serde(default)]
    pub(crate) difficulty_level: String,
    #[serde(default)]
    #[validate(range(min = 1, max = 100, message = "Points must be between 1 and 100."))]
    pub(crate) points: i32,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QuestionListQuery {
    #[serde(default)]
    pub(crate) page: Option<i64>,
    #[serde(default)]
    pub(crate) grade_level: Option<String>,
    #[serde(default)]
    pub(crate) difficulty: Option<String>,
    #[serde(default)]
    pub(crate) question_type: Option<String>,
    #[serde(default)]
    pub(crate) source: Option<String>,
    #[serde(default)]
    pub(crate) textbook: Option<String>,
    #[serde(default)]
    pub(crate) chapter: Option<String>,
    #[serde(default)]
    pub(crate) search: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: i64,
    pub(crate) user_id: String,
    pub(crate) question_text: String,
    pub(crate) question_type: QuestionType,
    pub(crate) question_type_label: &'static str,
    pub(crate) options: Option<Value>,
    pub(crate) correct_answer: Option<String>,
    pub(crate) grade_level: String,
    pub(crate) textbook: String,
    pub(crate) chapter: String,
    pub(crate) source: QuestionSource,
    pub(crate) source_label: &'static str,
    pub(crate) difficulty_level: DifficultyLevel,
    pub(crate) points: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl QuestionResponse {
    pub(crate) fn from_db(question: Question) -> Self {
        Self {
            id: question.id,
            user_id: question.user_id,
            question_text: question.question_text,
            question_type: question.question_type,
            question_type_label: question.question_type.label(),
            options: question.options.map(|options| options.0),
            correct_answer: question.correct_answer,
            grade_level: question.grade_level,
            textbook: question.textbook,
            chapter: question.chapter,
            source: question.source,
            source_label: question.source.label(),
            difficulty_level: question.difficulty_level,
            points: question.points,
            created_at: format_primitive(question.created_at),
            updated_at: format_primitive(question.updated_at),
        }
    }
}

/// A question inside a test paper, with its 1-based position.
#[derive(Debug, Serialize)]
pub(crate) struct PaperQuestionResponse {
    #[serde(flatten)]
    pub(crate) question: QuestionResponse,
    pub(crate) order: i32,
}

impl PaperQuestionResponse {
    pub(crate) fn from_db(row: PaperQuestion) -> Self {
        Self { question: QuestionResponse::from_db(row.question), order: row.position }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LabeledValue {
    pub(crate) value: &'static str,
    pub(crate) label: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct FilterOptionsResponse {
    pub(crate) grade_levels: Vec<String>,
    pub(crate) textbooks: Vec<String>,
    pub(crate) difficulties: Vec<&'static str>,
    pub(crate) question_types: Vec<LabeledValue>,
    pub(crate) sources: Vec<LabeledValue>,
}

impl FilterOptionsResponse {
    pub(crate) fn new(grade_levels: Vec<String>, textbooks: Vec<String>) -> Self {
        Self {
            grade_levels,
            textbooks,
            difficulties: DifficultyLevel::ALL.iter().map(|level| level.as_str()).collect(),
            question_types: QuestionType::ALL
                .iter()
                .map(|kind| LabeledValue { value: kind.as_str(), label: kind.label() })
                .collect(),
            sources: QuestionSource::ALL
                .iter()
                .map(|source| LabeledValue { value: source.as_str(), label: source.label() })
                .collect(),
        }
    }
}
