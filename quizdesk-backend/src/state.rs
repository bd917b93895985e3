use std::sync::Arc;

use quizdesk_db::{InMemoryQuestionRepository, QuestionRepository};
use quizdesk_job_queue::{ExplanationGenerator, ExplanationJobQueue, QuestionStore, QueueSettings};

/// One storage backend seen through both of its interfaces.
#[derive(Clone)]
pub struct Storage {
    pub repository: Arc<dyn QuestionRepository>,
    pub store: Arc<dyn QuestionStore>,
}

impl Storage {
    pub fn new<S>(backend: S) -> Self
    where
        S: QuestionRepository + QuestionStore + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            repository: backend.clone(),
            store: backend,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(InMemoryQuestionRepository::new())
    }

    pub fn backend(&self) -> &'static str {
        self.repository.backend()
    }
}

/// Shared application state passed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn QuestionRepository>,
    pub store: Arc<dyn QuestionStore>,
    pub explanations: ExplanationJobQueue,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("storage", &self.repository.backend())
            .field("explanations", &self.explanations)
            .finish()
    }
}

impl AppState {
    /// Build the state and its explanation queue on top of `storage`.
    pub fn new(
        storage: Storage,
        generator: Arc<dyn ExplanationGenerator>,
        settings: QueueSettings,
    ) -> Self {
        let explanations =
            ExplanationJobQueue::with_settings(generator, storage.store.clone(), settings);
        Self {
            repository: storage.repository,
            store: storage.store,
            explanations,
        }
    }
}
