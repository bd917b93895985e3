use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;

/// Parse an id path segment, answering 400 on malformed input.
pub fn parse_id(raw: &str, name: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request(format!("invalid {name}: {raw}")))
}

/// Decode an optional JSON body into a request DTO.
pub fn decode_body<T: DeserializeOwned>(body: Option<Json<Value>>) -> Result<T, ApiError> {
    let Json(payload) = body.ok_or_else(|| ApiError::bad_request("missing request body"))?;
    serde_json::from_value(payload).map_err(ApiError::from)
}
