//! In-process queue that generates missing answer explanations.
//!
//! Jobs carry a snapshot of the passage and question they explain. A single
//! drain loop takes them from the head of the queue in small batches, asks an
//! [`ExplanationGenerator`] for the text, and writes status transitions and the
//! result through a [`QuestionStore`]. Failed jobs are retried with a linear
//! backoff and dropped once the retry budget is spent.
//!
//! # Architecture
//!
//! - [`ExplanationJobQueue`] - the queue handle shared by callers
//! - [`ExplanationGenerator`] - produces explanation text (LLM client)
//! - [`QuestionStore`] - reads and writes question explanation fields
//! - [`QueueSettings`] - retry budget, backoff base, batch size
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use quizdesk_job_queue::{
//!     async_trait, ExplanationGenerator, ExplanationInput, ExplanationJobQueue,
//!     ExplanationState, ExplanationUpdate, JobQueueError, NewExplanationJob, QuestionStore,
//! };
//! use uuid::Uuid;
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl ExplanationGenerator for Canned {
//!     async fn generate_explanation(
//!         &self,
//!         input: &ExplanationInput,
//!     ) -> Result<String, JobQueueError> {
//!         Ok(format!("{} is correct.", input.correct_answer))
//!     }
//! }
//!
//! struct Discard;
//!
//! #[async_trait]
//! impl QuestionStore for Discard {
//!     async fn apply_explanation_update(
//!         &self,
//!         _question_id: Uuid,
//!         _update: ExplanationUpdate,
//!     ) -> Result<(), JobQueueError> {
//!         Ok(())
//!     }
//!
//!     async fn explanation_state(
//!         &self,
//!         _question_id: Uuid,
//!     ) -> Result<Option<ExplanationState>, JobQueueError> {
//!         Ok(None)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let queue = ExplanationJobQueue::new(Arc::new(Canned), Arc::new(Discard));
//!     queue
//!         .enqueue(NewExplanationJob {
//!             question_id: Uuid::new_v4(),
//!             passage_content: "...".into(),
//!             passage_comment: None,
//!             question_text: "...".into(),
//!             options: vec!["A".into(), "B".into()],
//!             correct_answer: "A".into(),
//!         })
//!         .await;
//!     println!("{:?}", queue.queue_status().await);
//! }
//! ```

mod collaborators;
mod error;
mod queue;
mod settings;
mod types;

pub use collaborators::{ExplanationGenerator, QuestionStore};
pub use error::JobQueueError;
pub use queue::ExplanationJobQueue;
pub use settings::{
    QueueSettings, DEFAULT_BATCH_SIZE, DEFAULT_LEVEL, DEFAULT_MAX_RETRIES,
    DEFAULT_RETRY_DELAY_BASE, DEFAULT_SUBJECT,
};
pub use types::{
    ExplanationInput, ExplanationJob, ExplanationState, ExplanationStatus, ExplanationUpdate,
    NewExplanationJob, QueueStatus,
};

// Re-export async_trait for implementors of the collaborator traits
pub use async_trait::async_trait;
