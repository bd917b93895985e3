use quizdesk_job_queue::JobQueueError;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while opening or querying question storage.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url cannot be empty")]
    EmptyDatabaseUrl,
    #[error("file/directory creation error: {0}")]
    FileCreation(String),
    #[error("passage not found: {0}")]
    PassageNotFound(Uuid),
    #[error("question not found: {0}")]
    QuestionNotFound(Uuid),
    /// A stored value could not be decoded (bad JSON options, unknown status, bad id).
    #[error("corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl From<DbError> for JobQueueError {
    fn from(error: DbError) -> Self {
        match error {
            DbError::QuestionNotFound(id) => JobQueueError::QuestionNotFound(id),
            other => JobQueueError::store(other.to_string()),
        }
    }
}
