use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::TestPaper;
use crate::schemas::question::{FilterOptionsResponse, PaperQuestionResponse, QuestionResponse};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TestPaperPayload {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The title must be 1-255 characters."))]
    pub(crate) title: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "The grade level must be 1-50 characters."))]
    pub(crate) grade_level: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The subject must be 1-255 characters."))]
    pub(crate) subject: String,
    #[serde(default)]
    #[validate(range(min = 10, max = 600, message = "Duration must be between 10 and 600 minutes."))]
    pub(crate) duration_minutes: Option<i32>,
    #[serde(default)]
    pub(crate) instructions: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one question must be selected."))]
    pub(crate) question_ids: Vec<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TestPaperListQuery {
    #[serde(default)]
    pub(crate) page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TestPaperResponse {
    pub(crate) id: i64,
    pub(crate) user_id: String,
    pub(crate) title: String,
    pub(crate) grade_level: String,
    pub(crate) subject: String,
    pub(crate) duration_minutes: Option<i32>,
    pub(crate) instructions: Option<String>,
    pub(crate) total_points: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl TestPaperResponse {
    pub(crate) fn from_db(paper: TestPaper) -> Self {
        Self {
            id: paper.id,
            user_id: paper.user_id,
            title: paper.title,
            grade_level: paper.grade_level,
            subject: paper.subject,
            duration_minutes: paper.duration_minutes,
            instructions: paper.instructions,
            total_points: paper.total_points,
            created_at: format_primitive(paper.created_at),
            updated_at: format_primitive(paper.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TestPaperSummaryResponse {
    #[serde(flatten)]
    pub(crate) paper: TestPaperResponse,
    pub(crate) questions_count: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct TestPaperDetailResponse {
    #[serde(flatten)]
    pub(crate) paper: TestPaperResponse,
    pub(crate) questions: Vec<PaperQuestionResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TextbookGroupResponse {
    pub(crate) textbook: String,
    pub(crate) questions: Vec<QuestionResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionPickerResponse {
    pub(crate) groups: Vec<TextbookGroupResponse>,
    pub(crate) filter_options: FilterOptionsResponse,
}
