mod handlers;

#[cfg(test)]
mod tests;

use axum::{routing::get, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_questions).post(handlers::create_question))
        .route("/filter-options", get(handlers::filter_options))
        .route(
            "/:question_id",
            get(handlers::get_question)
                .put(handlers::update_question)
                .delete(handlers::delete_question),
        )
}
