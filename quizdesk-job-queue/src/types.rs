//! Core types for the explanation queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to generate an explanation for one question.
///
/// The passage and question fields are a snapshot taken by the caller; the
/// queue never re-reads them from storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExplanationJob {
    pub question_id: Uuid,
    pub passage_content: String,
    pub passage_comment: Option<String>,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// A queued unit of work. Only `retry_count` changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationJob {
    pub id: Uuid,
    pub question_id: Uuid,
    pub passage_content: String,
    pub passage_comment: Option<String>,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub retry_count: u32,
    pub created_at: DateTime<Utc>,
}

impl ExplanationJob {
    /// Build a fresh job (retry count zero, stamped now) from a request.
    pub fn new(request: NewExplanationJob) -> Self {
        let NewExplanationJob {
            question_id,
            passage_content,
            passage_comment,
            question_text,
            options,
            correct_answer,
        } = request;

        Self {
            id: Uuid::new_v4(),
            question_id,
            passage_content,
            passage_comment,
            question_text,
            options,
            correct_answer,
            retry_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Generator input for this job, combined with the queue's fixed subject and level.
    pub fn to_input(&self, subject: &str, level: &str) -> ExplanationInput {
        ExplanationInput {
            passage_content: self.passage_content.clone(),
            passage_comment: self.passage_comment.clone(),
            question_text: self.question_text.clone(),
            options: self.options.clone(),
            correct_answer: self.correct_answer.clone(),
            subject: subject.to_owned(),
            level: level.to_owned(),
        }
    }
}

/// Everything the generator needs to write one explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationInput {
    pub passage_content: String,
    pub passage_comment: Option<String>,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub subject: String,
    pub level: String,
}

/// Lifecycle of a question's generated explanation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationStatus {
    Pending,
    Generating,
    Completed,
    Failed,
}

impl ExplanationStatus {
    /// Returns true if no further transition happens without a new job.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Generating => "generating",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ExplanationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExplanationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "generating" => Ok(Self::Generating),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown explanation status `{other}`")),
        }
    }
}

/// A write the queue asks the question store to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplanationUpdate {
    /// Queued by a caller; clears any previous error.
    Pending,
    Generating,
    /// Stores the explanation and clears any previous error.
    Completed {
        explanation: String,
        generated_at: DateTime<Utc>,
    },
    Failed {
        error: String,
    },
}

impl ExplanationUpdate {
    #[inline]
    pub const fn status(&self) -> ExplanationStatus {
        match self {
            Self::Pending => ExplanationStatus::Pending,
            Self::Generating => ExplanationStatus::Generating,
            Self::Completed { .. } => ExplanationStatus::Completed,
            Self::Failed { .. } => ExplanationStatus::Failed,
        }
    }
}

/// Explanation fields of a question record as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplanationState {
    pub status: Option<ExplanationStatus>,
    pub generated_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Snapshot of the queue for status polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    pub queue_size: usize,
    pub is_processing: bool,
    pub oldest_job: Option<DateTime<Utc>>,
}
