//! Passage and question storage.
//!
//! [`SqlQuestionRepository`] keeps records in SQLite with embedded
//! migrations; [`InMemoryQuestionRepository`] keeps them in process memory.
//! Both implement [`QuestionRepository`] for the HTTP layer and
//! [`QuestionStore`](quizdesk_job_queue::QuestionStore) for the explanation
//! queue.

pub mod config;
pub mod error;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod repository;
pub mod sql;

pub use config::DbConnectionConfig;
pub use error::DbError;
pub use memory::InMemoryQuestionRepository;
pub use migrations::{run_migrations, MIGRATOR};
pub use models::{NewPassage, NewQuestion, Passage, PassageWithQuestions, Question};
pub use pool::{create_pool, DbPool};
pub use repository::QuestionRepository;
pub use sql::SqlQuestionRepository;
