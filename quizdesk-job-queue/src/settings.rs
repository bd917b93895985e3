//! Tunables for the explanation queue.

use std::time::Duration;

/// Attempts after the first one before a job is dropped.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Retry `n` waits `n` times this long.
pub const DEFAULT_RETRY_DELAY_BASE: Duration = Duration::from_millis(5_000);
/// Jobs taken from the head of the queue per batch.
pub const DEFAULT_BATCH_SIZE: usize = 3;
pub const DEFAULT_SUBJECT: &str = "reading comprehension";
pub const DEFAULT_LEVEL: &str = "high school";

/// Queue configuration. The subject and level are the same for every job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSettings {
    pub max_retries: u32,
    pub retry_delay_base: Duration,
    pub batch_size: usize,
    pub subject: String,
    pub level: String,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_base: DEFAULT_RETRY_DELAY_BASE,
            batch_size: DEFAULT_BATCH_SIZE,
            subject: DEFAULT_SUBJECT.to_owned(),
            level: DEFAULT_LEVEL.to_owned(),
        }
    }
}

impl QueueSettings {
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_retry_delay_base(mut self, base: Duration) -> Self {
        self.retry_delay_base = base;
        self
    }

    /// Set the batch size. Zero is raised to one.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Linear backoff before the `retry`-th retry (1-indexed).
    #[inline]
    pub fn retry_delay(&self, retry: u32) -> Duration {
        self.retry_delay_base.saturating_mul(retry)
    }
}
