use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::pagination::PaginatedResponse;
use crate::core::state::AppState;
use crate::repositories::test_papers::TestPaperSummaryRow;
use crate::schemas::question::{FilterOptionsResponse, PaperQuestionResponse, QuestionResponse};
use crate::schemas::test_paper::{
    QuestionPickerResponse, TestPaperDetailResponse, TestPaperListQuery, TestPaperPayload,
    TestPaperResponse, TestPaperSummaryResponse, TextbookGroupResponse,
};
use crate::services::test_papers::{self, TestPaperDetail, TestPaperDraft};

pub(super) async fn list_test_papers(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<TestPaperListQuery>,
) -> Result<Json<PaginatedResponse<TestPaperSummaryResponse>>, ApiError> {
    let page = test_papers::list(state.db(), &user, query.page).await?;
    Ok(Json(PaginatedResponse::from_page(page, summary_response)))
}

pub(super) async fn question_picker(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<QuestionPickerResponse>, ApiError> {
    let picker = test_papers::question_picker(state.db(), &user).await?;

    let groups = picker
        .groups
        .into_iter()
        .map(|(textbook, questions)| TextbookGroupResponse {
            textbook,
            questions: questions.into_iter().map(QuestionResponse::from_db).collect(),
        })
        .collect();

    Ok(Json(QuestionPickerResponse {
        groups,
        filter_options: FilterOptionsResponse::new(
            picker.filter_options.grade_levels,
            picker.filter_options.textbooks,
        ),
    }))
}

pub(super) async fn create_test_paper(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<TestPaperPayload>,
) -> Result<(StatusCode, Json<TestPaperDetailResponse>), ApiError> {
    let draft = TestPaperDraft::from_payload(payload)?;
    let detail = test_papers::create(state.db(), &user, &draft).await?;

    Ok((StatusCode::CREATED, Json(detail_response(detail))))
}

pub(super) async fn get_test_paper(
    Path(test_paper_id): Path<i64>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<TestPaperDetailResponse>, ApiError> {
    let detail = test_papers::show(state.db(), &user, test_paper_id).await?;
    Ok(Json(detail_response(detail)))
}

pub(super) async fn update_test_paper(
    Path(test_paper_id): Path<i64>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<TestPaperPayload>,
) -> Result<Json<TestPaperDetailResponse>, ApiError> {
    let draft = TestPaperDraft::from_payload(payload)?;
    let detail = test_papers::update(state.db(), &user, test_paper_id, &draft).await?;

    Ok(Json(detail_response(detail)))
}

pub(super) async fn delete_test_paper(
    Path(test_paper_id): Path<i64>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    test_papers::destroy(state.db(), &user, test_paper_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn summary_response(row: TestPaperSummaryRow) -> TestPaperSummaryResponse {
    TestPaperSummaryResponse {
        paper: TestPaperResponse::from_db(row.paper),
        questions_count: row.questions_count,
    }
}

fn detail_response(detail: TestPaperDetail) -> TestPaperDetailResponse {
    TestPaperDetailResponse {
        paper: TestPaperResponse::from_db(detail.paper),
        questions: detail.questions.into_iter().map(PaperQuestionResponse::from_db).collect(),
    }
}
