use std::sync::Arc;

use axum::extract::{Extension, Json};
use axum::http::StatusCode;
use serde_json::{json, Value};

use super::dto::CreatePassage;
use crate::handlers::utils::decode_body;
use crate::{error::ApiError, state::AppState};

/// POST /passages
pub async fn create_passage(
    Extension(state): Extension<Arc<AppState>>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let dto: CreatePassage = decode_body(body)?;
    dto.validate().map_err(|issues| ApiError::validation(&issues))?;

    let passage = state.repository.create_passage(dto.into_new_passage()).await?;
    tracing::info!(passage_id = %passage.id, "passage created");

    Ok((StatusCode::CREATED, Json(json!(passage))))
}
