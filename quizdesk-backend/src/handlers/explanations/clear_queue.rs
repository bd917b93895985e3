use std::sync::Arc;

use axum::extract::Extension;
use axum::Json;
use serde_json::{json, Value};

use crate::{error::ApiError, state::AppState};

/// DELETE /explanations/queue
/// Drop pending jobs. Batches already running finish normally.
pub async fn clear_queue(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let removed = state.explanations.clear_queue().await;
    Ok(Json(json!({ "cleared": true, "removed": removed })))
}
