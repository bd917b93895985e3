use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::Json;
use serde_json::{json, Value};

use crate::handlers::utils::parse_id;
use crate::{error::ApiError, state::AppState};

/// GET /passages/{id}
/// The passage with its questions, oldest first.
pub async fn get_passage(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, "passage id")?;
    let passage = state
        .repository
        .get_passage_with_questions(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("passage {id}")))?;
    Ok(Json(json!(passage)))
}
