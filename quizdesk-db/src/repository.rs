use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{NewPassage, NewQuestion, Passage, PassageWithQuestions, Question};

/// Passage and question storage used by the HTTP handlers.
///
/// Explanation fields are written through
/// [`QuestionStore`](quizdesk_job_queue::QuestionStore), which every
/// implementation also provides.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Short backend label reported by readiness checks.
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), DbError>;

    async fn create_passage(&self, passage: NewPassage) -> Result<Passage, DbError>;

    async fn get_passage(&self, id: Uuid) -> Result<Option<Passage>, DbError>;

    /// Fails with [`DbError::PassageNotFound`] if the passage is unknown.
    async fn create_question(&self, question: NewQuestion) -> Result<Question, DbError>;

    async fn get_question(&self, id: Uuid) -> Result<Option<Question>, DbError>;

    /// Questions of a passage, oldest first.
    async fn list_questions(&self, passage_id: Uuid) -> Result<Vec<Question>, DbError>;

    async fn get_passage_with_questions(
        &self,
        id: Uuid,
    ) -> Result<Option<PassageWithQuestions>, DbError> {
        let Some(passage) = self.get_passage(id).await? else {
            return Ok(None);
        };
        let questions = self.list_questions(id).await?;
        Ok(Some(PassageWithQuestions {
            passage,
            questions,
        }))
    }
}
