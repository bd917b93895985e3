//! Traits for the services the queue drives.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::JobQueueError;
use crate::types::{ExplanationInput, ExplanationState, ExplanationUpdate};

/// Produces explanation text for a quiz question, typically through an LLM.
///
/// Implementations either return the full text or fail; partial results are
/// never written back.
#[async_trait]
pub trait ExplanationGenerator: Send + Sync {
    async fn generate_explanation(&self, input: &ExplanationInput)
        -> Result<String, JobQueueError>;
}

/// Access to the explanation fields of stored question records.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Apply one explanation write to a question.
    ///
    /// Fails with [`JobQueueError::QuestionNotFound`] when the id is unknown.
    async fn apply_explanation_update(
        &self,
        question_id: Uuid,
        update: ExplanationUpdate,
    ) -> Result<(), JobQueueError>;

    /// Read the explanation status fields, or `None` if the question is missing.
    async fn explanation_state(
        &self,
        question_id: Uuid,
    ) -> Result<Option<ExplanationState>, JobQueueError>;
}
