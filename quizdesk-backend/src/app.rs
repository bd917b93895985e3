use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::handlers::{explanations, passages, questions};
use crate::state::AppState;

// Passages are plain text; 1 MB is plenty.
const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Build the primary axum router with the provided shared application state.
pub fn build_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/passages", post(passages::create_passage))
        .route("/passages/{id}", get(passages::get_passage))
        .route("/passages/{id}/questions", post(questions::create_question))
        .route("/questions/{id}", get(questions::get_question))
        .route("/questions/{id}/explanation", post(explanations::regenerate))
        .route(
            "/questions/{id}/explanation/status",
            get(explanations::explanation_status),
        )
        .route(
            "/explanations/queue",
            get(explanations::queue_status).delete(explanations::clear_queue),
        )
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
        .layer(Extension(state));

    Router::new().nest("/api", router)
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness: storage must answer a ping.
async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    let storage = state.repository.backend();
    match state.repository.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ready", "storage": storage })),
        ),
        Err(error) => {
            tracing::warn!(%error, storage, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "storage": storage })),
            )
        }
    }
}
