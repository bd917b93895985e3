use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::Json;
use serde_json::{json, Value};

use crate::handlers::utils::parse_id;
use crate::{error::ApiError, state::AppState};

/// GET /questions/{id}
pub async fn get_question(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, "question id")?;
    let question = state
        .repository
        .get_question(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("question {id}")))?;
    Ok(Json(json!(question)))
}
