//! The explanation job queue.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::collaborators::{ExplanationGenerator, QuestionStore};
use crate::error::JobQueueError;
use crate::settings::QueueSettings;
use crate::types::{
    ExplanationJob, ExplanationState, ExplanationUpdate, NewExplanationJob, QueueStatus,
};

/// In-memory FIFO of explanation jobs with a single drain loop.
///
/// Cloning yields another handle to the same queue. Jobs live only in process
/// memory; anything still queued when the process exits is lost.
#[derive(Clone)]
pub struct ExplanationJobQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    jobs: Mutex<VecDeque<ExplanationJob>>,
    /// Set while a drain loop owns the queue. Cleared under the `jobs` lock.
    is_processing: AtomicBool,
    generator: Arc<dyn ExplanationGenerator>,
    store: Arc<dyn QuestionStore>,
    settings: QueueSettings,
}

impl fmt::Debug for ExplanationJobQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplanationJobQueue")
            .field("jobs", &"<Mutex<VecDeque<ExplanationJob>>>")
            .field(
                "is_processing",
                &self.inner.is_processing.load(Ordering::Acquire),
            )
            .field("settings", &self.inner.settings)
            .finish()
    }
}

impl ExplanationJobQueue {
    pub fn new(generator: Arc<dyn ExplanationGenerator>, store: Arc<dyn QuestionStore>) -> Self {
        Self::with_settings(generator, store, QueueSettings::default())
    }

    pub fn with_settings(
        generator: Arc<dyn ExplanationGenerator>,
        store: Arc<dyn QuestionStore>,
        settings: QueueSettings,
    ) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                jobs: Mutex::new(VecDeque::new()),
                is_processing: AtomicBool::new(false),
                generator,
                store,
                settings,
            }),
        }
    }

    pub fn settings(&self) -> &QueueSettings {
        &self.inner.settings
    }

    /// Append a job to the tail and start draining if idle.
    ///
    /// Returns as soon as the job is queued; generation happens in the background.
    pub async fn enqueue(&self, request: NewExplanationJob) -> Uuid {
        let job = ExplanationJob::new(request);
        let job_id = job.id;
        debug!(job_id = %job_id, question_id = %job.question_id, "explanation job enqueued");

        self.inner.jobs.lock().await.push_back(job);
        Arc::clone(&self.inner).trigger_drain();
        job_id
    }

    /// Append several jobs in order under one lock, then start draining once.
    pub async fn enqueue_many<I>(&self, requests: I) -> Vec<Uuid>
    where
        I: IntoIterator<Item = NewExplanationJob>,
    {
        let jobs: Vec<ExplanationJob> = requests.into_iter().map(ExplanationJob::new).collect();
        if jobs.is_empty() {
            return Vec::new();
        }
        let ids: Vec<Uuid> = jobs.iter().map(|job| job.id).collect();

        self.inner.jobs.lock().await.extend(jobs);
        debug!(count = ids.len(), "explanation jobs enqueued");
        Arc::clone(&self.inner).trigger_drain();
        ids
    }

    pub async fn queue_status(&self) -> QueueStatus {
        let jobs = self.inner.jobs.lock().await;
        QueueStatus {
            queue_size: jobs.len(),
            is_processing: self.inner.is_processing.load(Ordering::Acquire),
            oldest_job: jobs.front().map(|job| job.created_at),
        }
    }

    /// Read a question's explanation fields straight from the store.
    ///
    /// Missing questions and failed reads both yield `None`.
    pub async fn explanation_status(&self, question_id: Uuid) -> Option<ExplanationState> {
        match self.inner.store.explanation_state(question_id).await {
            Ok(state) => state,
            Err(error) => {
                warn!(question_id = %question_id, %error, "failed to read explanation status");
                None
            }
        }
    }

    /// Drop every queued job. In-flight batches and the processing flag are untouched.
    pub async fn clear_queue(&self) -> usize {
        let mut jobs = self.inner.jobs.lock().await;
        let cleared = jobs.len();
        jobs.clear();
        info!(cleared, "explanation queue cleared");
        cleared
    }
}

impl QueueInner {
    /// Start a drain loop unless one is already running.
    fn trigger_drain(self: Arc<Self>) {
        if self
            .is_processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        tokio::spawn(async move { self.drain().await });
    }

    async fn drain(self: Arc<Self>) {
        let mut guard = DrainGuard {
            flag: &self.is_processing,
            armed: true,
        };

        loop {
            let batch: Vec<ExplanationJob> = {
                let mut jobs = self.jobs.lock().await;
                if jobs.is_empty() {
                    self.is_processing.store(false, Ordering::Release);
                    guard.disarm();
                    break;
                }
                let take = self.settings.batch_size.max(1).min(jobs.len());
                jobs.drain(..take).collect()
            };

            debug!(batch_size = batch.len(), "processing explanation batch");
            let outcomes = join_all(batch.into_iter().map(|job| self.run_job(job))).await;

            for (job, outcome) in outcomes {
                if let Err(error) = outcome {
                    Arc::clone(&self).schedule_retry(job, error);
                }
            }
        }

        debug!("explanation queue drained");
    }

    async fn run_job(&self, job: ExplanationJob) -> (ExplanationJob, Result<(), JobQueueError>) {
        let outcome = self.process(&job).await;
        (job, outcome)
    }

    async fn process(&self, job: &ExplanationJob) -> Result<(), JobQueueError> {
        let Err(error) = self.generate_and_store(job).await else {
            return Ok(());
        };

        let update = ExplanationUpdate::Failed {
            error: error.to_string(),
        };
        if let Err(write_error) = self
            .store
            .apply_explanation_update(job.question_id, update)
            .await
        {
            error!(
                job_id = %job.id,
                question_id = %job.question_id,
                error = %write_error,
                "failed to record explanation failure"
            );
        }
        Err(error)
    }

    async fn generate_and_store(&self, job: &ExplanationJob) -> Result<(), JobQueueError> {
        self.store
            .apply_explanation_update(job.question_id, ExplanationUpdate::Generating)
            .await?;

        let input = job.to_input(&self.settings.subject, &self.settings.level);
        let explanation = self.generator.generate_explanation(&input).await?;
        if explanation.trim().is_empty() {
            return Err(JobQueueError::generation(
                "generator returned an empty explanation",
            ));
        }

        self.store
            .apply_explanation_update(
                job.question_id,
                ExplanationUpdate::Completed {
                    explanation,
                    generated_at: Utc::now(),
                },
            )
            .await?;

        info!(
            job_id = %job.id,
            question_id = %job.question_id,
            retry_count = job.retry_count,
            "explanation generated"
        );
        Ok(())
    }

    /// Requeue a failed job after a linear backoff, or drop it for good.
    fn schedule_retry(self: Arc<Self>, mut job: ExplanationJob, error: JobQueueError) {
        if job.retry_count >= self.settings.max_retries {
            warn!(
                job_id = %job.id,
                question_id = %job.question_id,
                retry_count = job.retry_count,
                %error,
                "explanation job dropped after exhausting retries"
            );
            return;
        }

        job.retry_count += 1;
        let delay = self.settings.retry_delay(job.retry_count);
        info!(
            job_id = %job.id,
            question_id = %job.question_id,
            retry_count = job.retry_count,
            delay_ms = delay.as_millis() as u64,
            %error,
            "scheduling explanation retry"
        );

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            self.jobs.lock().await.push_back(job);
            self.trigger_drain();
        });
    }
}

/// Releases the processing flag if a drain loop unwinds or is cancelled.
struct DrainGuard<'a> {
    flag: &'a AtomicBool,
    armed: bool,
}

impl DrainGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            error!("explanation drain loop aborted; releasing processing flag");
            self.flag.store(false, Ordering::Release);
        }
    }
}
