use std::collections::HashMap;

use async_trait::async_trait;
use quizdesk_job_queue::{ExplanationState, ExplanationUpdate, JobQueueError, QuestionStore};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{NewPassage, NewQuestion, Passage, Question};
use crate::repository::QuestionRepository;

#[derive(Default)]
struct Tables {
    passages: HashMap<Uuid, Passage>,
    questions: HashMap<Uuid, Question>,
    /// Question ids in insertion order.
    question_order: Vec<Uuid>,
}

/// Process-local storage, used when no database is available and in tests.
#[derive(Default)]
pub struct InMemoryQuestionRepository {
    tables: RwLock<Tables>,
}

impl std::fmt::Debug for InMemoryQuestionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryQuestionRepository")
            .field("tables", &"<RwLock<Tables>>")
            .finish()
    }
}

impl InMemoryQuestionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }

    async fn create_passage(&self, passage: NewPassage) -> Result<Passage, DbError> {
        let passage = passage.into_passage();
        self.tables
            .write()
            .await
            .passages
            .insert(passage.id, passage.clone());
        Ok(passage)
    }

    async fn get_passage(&self, id: Uuid) -> Result<Option<Passage>, DbError> {
        Ok(self.tables.read().await.passages.get(&id).cloned())
    }

    async fn create_question(&self, question: NewQuestion) -> Result<Question, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.passages.contains_key(&question.passage_id) {
            return Err(DbError::PassageNotFound(question.passage_id));
        }
        let question = question.into_question();
        tables.question_order.push(question.id);
        tables.questions.insert(question.id, question.clone());
        Ok(question)
    }

    async fn get_question(&self, id: Uuid) -> Result<Option<Question>, DbError> {
        Ok(self.tables.read().await.questions.get(&id).cloned())
    }

    async fn list_questions(&self, passage_id: Uuid) -> Result<Vec<Question>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .question_order
            .iter()
            .filter_map(|id| tables.questions.get(id))
            .filter(|q| q.passage_id == passage_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl QuestionStore for InMemoryQuestionRepository {
    async fn apply_explanation_update(
        &self,
        question_id: Uuid,
        update: ExplanationUpdate,
    ) -> Result<(), JobQueueError> {
        let mut tables = self.tables.write().await;
        let question = tables
            .questions
            .get_mut(&question_id)
            .ok_or(JobQueueError::QuestionNotFound(question_id))?;
        question.apply(update);
        Ok(())
    }

    async fn explanation_state(
        &self,
        question_id: Uuid,
    ) -> Result<Option<ExplanationState>, JobQueueError> {
        Ok(self
            .tables
            .read()
            .await
            .questions
            .get(&question_id)
            .map(Question::explanation_state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizdesk_job_queue::ExplanationStatus;

    async fn seeded() -> (InMemoryQuestionRepository, Passage) {
        let repo = InMemoryQuestionRepository::new();
        let passage = repo
            .create_passage(NewPassage {
                title: "Tides".into(),
                content: "The moon pulls on the oceans.".into(),
                comment: None,
            })
            .await
            .unwrap();
        (repo, passage)
    }

    fn question_for(passage_id: Uuid, text: &str) -> NewQuestion {
        NewQuestion {
            passage_id,
            question_text: text.into(),
            options: vec!["The moon".into(), "The wind".into()],
            correct_answer: "The moon".into(),
            explanation: None,
        }
    }

    #[tokio::test]
    async fn lists_questions_in_creation_order() {
        let (repo, passage) = seeded().await;
        for text in ["first", "second", "third"] {
            repo.create_question(question_for(passage.id, text))
                .await
                .unwrap();
        }

        let texts: Vec<String> = repo
            .list_questions(passage.id)
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.question_text)
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn question_needs_an_existing_passage() {
        let repo = InMemoryQuestionRepository::new();
        let err = repo
            .create_question(question_for(Uuid::new_v4(), "orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::PassageNotFound(_)));
    }

    #[tokio::test]
    async fn explanation_updates_round_through_store() {
        let (repo, passage) = seeded().await;
        let question = repo
            .create_question(question_for(passage.id, "What causes tides?"))
            .await
            .unwrap();

        repo.apply_explanation_update(question.id, ExplanationUpdate::Generating)
            .await
            .unwrap();
        let state = repo.explanation_state(question.id).await.unwrap().unwrap();
        assert_eq!(state.status, Some(ExplanationStatus::Generating));

        let missing = repo
            .apply_explanation_update(Uuid::new_v4(), ExplanationUpdate::Generating)
            .await;
        assert!(matches!(missing, Err(JobQueueError::QuestionNotFound(_))));
        assert_eq!(repo.explanation_state(Uuid::new_v4()).await.unwrap(), None);
    }
}
