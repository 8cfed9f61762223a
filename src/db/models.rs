use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{DifficultyLevel, QuestionSource, QuestionType};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) full_name: String,
    pub(crate) hashed_password: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: i64,
    pub(crate) user_id: String,
    pub(crate) question_text: String,
    pub(crate) question_type: QuestionType,
    pub(crate) options: Option<Json<serde_json::Value>>,
    pub(crate) correct_answer: Option<String>,
    pub(crate) grade_level: String,
    pub(crate) textbook: String,
    pub(crate) chapter: String,
    pub(crate) source: QuestionSource,
    pub(crate) difficulty_level: DifficultyLevel,
    pub(crate) points: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct TestPaper {
    pub(crate) id: i64,
    pub(crate) user_id: String,
    pub(crate) title: String,
    pub(crate) grade_level: String,
    pub(crate) subject: String,
    pub(crate) duration_minutes: Option<i32>,
    pub(crate) instructions: Option<String>,
    pub(crate) total_points: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// A question as it sits inside one test paper, with its 1-based position.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct PaperQuestion {
    #[sqlx(flatten)]
    pub(crate) question: Question,
    pub(crate) position: i32,
}
