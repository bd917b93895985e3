//! Error types for the explanation queue.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the queue's collaborators.
///
/// `Generation` displays the bare upstream message because that text is what
/// ends up in a question's `explanation_error`.
#[derive(Debug, Error)]
pub enum JobQueueError {
    #[error("{0}")]
    Generation(String),

    #[error("question store error: {0}")]
    Store(String),

    #[error("question not found: {0}")]
    QuestionNotFound(Uuid),
}

impl JobQueueError {
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }
}
