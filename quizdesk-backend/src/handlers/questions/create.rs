use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use axum::http::StatusCode;
use serde_json::{json, Value};

use super::dto::CreateQuestion;
use crate::handlers::explanations::job_for;
use crate::handlers::utils::{decode_body, parse_id};
use crate::{error::ApiError, state::AppState};

/// POST /passages/{id}/questions
///
/// Questions created without an explanation are stored as `pending` and
/// queued for generation.
pub async fn create_question(
    Extension(state): Extension<Arc<AppState>>,
    Path(passage_id): Path<String>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let passage_id = parse_id(&passage_id, "passage id")?;
    let dto: CreateQuestion = decode_body(body)?;
    dto.validate().map_err(|issues| ApiError::validation(&issues))?;

    let passage = state
        .repository
        .get_passage(passage_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("passage {passage_id}")))?;

    let question = state
        .repository
        .create_question(dto.into_new_question(passage_id))
        .await?;

    let job_id = if question.explanation.is_none() {
        Some(state.explanations.enqueue(job_for(&passage, &question)).await)
    } else {
        None
    };
    tracing::info!(
        question_id = %question.id,
        passage_id = %passage_id,
        queued = job_id.is_some(),
        "question created"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({ "question": question, "jobId": job_id })),
    ))
}
