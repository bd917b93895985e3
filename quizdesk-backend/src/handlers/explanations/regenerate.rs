use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::Json;
use quizdesk_db::DbError;
use quizdesk_job_queue::{ExplanationUpdate, JobQueueError};
use serde_json::{json, Value};

use super::job_for;
use crate::handlers::utils::parse_id;
use crate::{error::ApiError, state::AppState};

/// POST /questions/{id}/explanation
/// Mark the question `pending` and queue a fresh generation job.
pub async fn regenerate(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let id = parse_id(&id, "question id")?;
    let question = state
        .repository
        .get_question(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("question {id}")))?;
    let passage = state
        .repository
        .get_passage(question.passage_id)
        .await?
        .ok_or(DbError::PassageNotFound(question.passage_id))?;

    state
        .store
        .apply_explanation_update(id, ExplanationUpdate::Pending)
        .await
        .map_err(|error| match error {
            JobQueueError::QuestionNotFound(_) => ApiError::not_found(format!("question {id}")),
            other => ApiError::Unavailable(other.to_string()),
        })?;

    let job_id = state.explanations.enqueue(job_for(&passage, &question)).await;
    tracing::info!(question_id = %id, job_id = %job_id, "explanation regeneration queued");

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "questionId": id,
            "jobId": job_id,
            "status": "pending",
        })),
    ))
}
