use quizdesk_job_queue::JobQueueError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("OpenAI API key is not configured")]
    MissingApiKey,
    #[error("request to language model failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("language model returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unreadable language model response: {0}")]
    Decode(String),
    #[error("language model returned no explanation")]
    EmptyCompletion,
}

impl From<AiError> for JobQueueError {
    fn from(error: AiError) -> Self {
        JobQueueError::generation(error.to_string())
    }
}
