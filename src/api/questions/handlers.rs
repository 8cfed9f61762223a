use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::pagination::PaginatedResponse;
use crate::core::state::AppState;
use crate::schemas::question::{
    FilterOptionsResponse, QuestionListQuery, QuestionPayload, QuestionResponse,
};
use crate::services::question_filter::{self, FilterCriteria};
use crate::services::questions::{self, QuestionDraft};

pub(super) async fn list_questions(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<QuestionListQuery>,
) -> Result<Json<PaginatedResponse<QuestionResponse>>, ApiError> {
    let criteria = FilterCriteria {
        grade_level: query.grade_level,
        difficulty: query.difficulty,
        question_type: query.question_type,
        source: query.source,
        textbook: query.textbook,
        chapter: query.chapter,
        search: query.search,
    };

    let page = question_filter::list(state.db(), &user, &criteria, query.page).await?;

    Ok(Json(PaginatedResponse::from_page(page, QuestionResponse::from_db)))
}

pub(super) async fn filter_options(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<FilterOptionsResponse>, ApiError> {
    let options = question_filter::filter_options(state.db(), &user).await?;

    Ok(Json(FilterOptionsResponse::new(options.grade_levels, options.textbooks)))
}

pub(super) async fn create_question(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<QuestionPayload>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    let draft = QuestionDraft::from_payload(payload)?;
    let question = questions::create(state.db(), &user, &draft).await?;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from_db(question))))
}

pub(super) async fn get_question(
    Path(question_id): Path<i64>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let question = questions::show(state.db(), &user, question_id).await?;
    Ok(Json(QuestionResponse::from_db(question)))
}

pub(super) async fn update_question(
    Path(question_id): Path<i64>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<QuestionPayload>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let draft = QuestionDraft::from_payload(payload)?;
    let question = questions::update(state.db(), &user, question_id, &draft).await?;

    Ok(Json(QuestionResponse::from_db(question)))
}

pub(super) async fn delete_question(
    Path(question_id): Path<i64>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    questions::destroy(state.db(), &user, question_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
