//! OpenAI-compatible [`ExplanationGenerator`](quizdesk_job_queue::ExplanationGenerator).

mod client;
mod error;
pub mod prompt;
pub mod types;

pub use client::{
    OpenAiExplanationClient, OpenAiSettings, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
};
pub use error::AiError;
