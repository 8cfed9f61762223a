use axum::{extract::State, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::test_papers::summary_response;
use crate::core::state::AppState;
use crate::schemas::dashboard::{DashboardResponse, DashboardStatsResponse};
use crate::schemas::question::QuestionResponse;
use crate::services::dashboard;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(overview))
}

async fn overview(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let stats = dashboard::overview(state.db(), &user).await?;

    Ok(Json(DashboardResponse {
        stats: DashboardStatsResponse {
            total_questions: stats.total_questions,
            total_test_papers: stats.total_test_papers,
            questions_by_type: stats
                .questions_by_type
                .into_iter()
                .map(|(kind, count)| (kind.as_str(), count))
                .collect(),
            questions_by_difficulty: stats
                .questions_by_difficulty
                .into_iter()
                .map(|(level, count)| (level.as_str(), count))
                .collect(),
        },
        recent_questions: stats.recent_questions.into_iter().map(QuestionResponse::from_db).collect(),
        recent_test_papers: stats.recent_test_papers.into_iter().map(summary_response).collect(),
    }))
}
