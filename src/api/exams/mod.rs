mod handlers;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/subjects", get(handlers::list_subjects))
        .route("/papers", get(handlers::list_papers))
        .route("/papers/:paper_id", get(handlers::get_paper))
        .route("/start", post(handlers::start_exam))
        .route("/attempts", get(handlers::list_attempts))
        .route("/attempts/:attempt_id", get(handlers::get_attempt))
        .route("/attempts/:attempt_id/response", post(handlers::save_response))
        .route("/attempts/:attempt_id/submit", post(handlers::submit_exam))
}
