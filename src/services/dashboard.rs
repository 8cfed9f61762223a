use sqlx::PgPool;

use crate::db::models::{Question, User};
use crate::db::types::{DifficultyLevel, QuestionType};
use crate::repositories;
use crate::repositories::test_papers::TestPaperSummaryRow;
use crate::services::ServiceError;

const RECENT_LIMIT: i64 = 5;

#[derive(Debug)]
pub(crate) struct DashboardStats {
    pub(crate) total_questions: i64,
    pub(crate) total_test_papers: i64,
    pub(crate) questions_by_type: Vec<(QuestionType, i64)>,
    pub(crate) questions_by_difficulty: Vec<(DifficultyLevel, i64)>,
    pub(crate) recent_questions: Vec<Question>,
    pub(crate) recent_test_papers: Vec<TestPaperSummaryRow>,
}

pub(crate) async fn overview(db: &PgPool, owner: &User) -> Result<DashboardStats, ServiceError> {
    let total_questions = repositories::questions::count_for_owner(db, &owner.id).await?;
    let total_test_papers = repositories::test_papers::count_for_owner(db, &owner.id).await?;
    let mut questions_by_type = repositories::questions::count_by_type(db, &owner.id).await?;
    let mut questions_by_difficulty =
        repositories::questions::count_by_difficulty(db, &owner.id).await?;
    let recent_questions =
        repositories::questions::list_recent(db, &owner.id, RECENT_LIMIT).await?;
    let recent_test_papers =
        repositories::test_papers::list_for_owner(db, &owner.id, 0, RECENT_LIMIT).await?;

    questions_by_type.sort_by_key(|(kind, _)| *kind);
    questions_by_difficulty.sort_by_key(|(level, _)| *level);

    Ok(DashboardStats {
        total_questions,
        total_test_papers,
        questions_by_type,
        questions_by_difficulty,
        recent_questions,
        recent_test_papers,
    })
}
