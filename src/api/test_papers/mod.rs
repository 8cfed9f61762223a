mod handlers;


use axum::{routing::get, Router};

use crate::core::state::AppState;

pub(crate) use handlers::summary_response;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_test_papers).post(handlers::create_test_paper))
        .route("/question-picker", get(handlers::question_picker))
        .route(
            "/:test_paper_id",
            get(handlers::get_test_paper)
                .put(handlers::update_test_paper)
                .delete(handlers::delete_test_paper),
        )
}
