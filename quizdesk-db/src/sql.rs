use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quizdesk_job_queue::{
    ExplanationState, ExplanationStatus, ExplanationUpdate, JobQueueError, QuestionStore,
};
use tracing::info;
use uuid::Uuid;

use crate::config::DbConnectionConfig;
use crate::error::DbError;
use crate::migrations::run_migrations;
use crate::models::{NewPassage, NewQuestion, Passage, Question};
use crate::pool::{create_pool, DbPool};
use crate::repository::QuestionRepository;

const QUESTION_COLUMNS: &str = "id, passage_id, question_text, options, correct_answer, \
     explanation, explanation_status, explanation_generated_at, explanation_error, created_at";

#[derive(sqlx::FromRow)]
struct PassageRow {
    id: String,
    title: String,
    content: String,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: String,
    passage_id: String,
    question_text: String,
    options: String,
    correct_answer: String,
    explanation: Option<String>,
    explanation_status: Option<String>,
    explanation_generated_at: Option<DateTime<Utc>>,
    explanation_error: Option<String>,
    created_at: DateTime<Utc>,
}

fn parse_id(table: &'static str, raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::CorruptRow {
        table,
        message: format!("invalid id '{raw}': {e}"),
    })
}

impl TryFrom<PassageRow> for Passage {
    type Error = DbError;

    fn try_from(row: PassageRow) -> Result<Self, Self::Error> {
        Ok(Passage {
            id: parse_id("passages", &row.id)?,
            title: row.title,
            content: row.content,
            comment: row.comment,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<QuestionRow> for Question {
    type Error = DbError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let options: Vec<String> =
            serde_json::from_str(&row.options).map_err(|e| DbError::CorruptRow {
                table: "questions",
                message: format!("invalid options: {e}"),
            })?;
        let explanation_status = row
            .explanation_status
            .as_deref()
            .map(str::parse::<ExplanationStatus>)
            .transpose()
            .map_err(|message| DbError::CorruptRow {
                table: "questions",
                message,
            })?;

        Ok(Question {
            id: parse_id("questions", &row.id)?,
            passage_id: parse_id("questions", &row.passage_id)?,
            question_text: row.question_text,
            options,
            correct_answer: row.correct_answer,
            explanation: row.explanation,
            explanation_status,
            explanation_generated_at: row.explanation_generated_at,
            explanation_error: row.explanation_error,
            created_at: row.created_at,
        })
    }
}

/// SQLite-backed storage.
#[derive(Debug, Clone)]
pub struct SqlQuestionRepository {
    pool: DbPool,
}

impl SqlQuestionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open the pool described by `config` and bring the schema up to date.
    pub async fn connect(config: &DbConnectionConfig) -> Result<Self, DbError> {
        let pool = create_pool(config).await?;
        run_migrations(&pool).await?;
        info!(in_memory = config.is_in_memory(), "sqlite question store ready");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn update_explanation(
        &self,
        question_id: Uuid,
        update: &ExplanationUpdate,
    ) -> Result<(), DbError> {
        let id = question_id.to_string();
        let status = update.status().as_str();
        let query = match update {
            ExplanationUpdate::Pending => sqlx::query(
                "UPDATE questions SET explanation_status = ?, explanation_error = NULL WHERE id = ?",
            )
            .bind(status)
            .bind(id),
            ExplanationUpdate::Generating => {
                sqlx::query("UPDATE questions SET explanation_status = ? WHERE id = ?")
                    .bind(status)
                    .bind(id)
            }
            ExplanationUpdate::Completed {
                explanation,
                generated_at,
            } => sqlx::query(
                "UPDATE questions SET explanation = ?, explanation_status = ?, \
                 explanation_generated_at = ?, explanation_error = NULL WHERE id = ?",
            )
            .bind(explanation.as_str())
            .bind(status)
            .bind(*generated_at)
            .bind(id),
            ExplanationUpdate::Failed { error } => sqlx::query(
                "UPDATE questions SET explanation_status = ?, explanation_error = ? WHERE id = ?",
            )
            .bind(status)
            .bind(error.as_str())
            .bind(id),
        };

        let result = query.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(DbError::QuestionNotFound(question_id));
        }
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for SqlQuestionRepository {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_passage(&self, passage: NewPassage) -> Result<Passage, DbError> {
        let passage = passage.into_passage();
        sqlx::query(
            "INSERT INTO passages (id, title, content, comment, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(passage.id.to_string())
        .bind(&passage.title)
        .bind(&passage.content)
        .bind(passage.comment.as_deref())
        .bind(passage.created_at)
        .execute(&self.pool)
        .await?;
        Ok(passage)
    }

    async fn get_passage(&self, id: Uuid) -> Result<Option<Passage>, DbError> {
        sqlx::query_as::<_, PassageRow>(
            "SELECT id, title, content, comment, created_at FROM passages WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .map(Passage::try_from)
        .transpose()
    }

    async fn create_question(&self, question: NewQuestion) -> Result<Question, DbError> {
        if self.get_passage(question.passage_id).await?.is_none() {
            return Err(DbError::PassageNotFound(question.passage_id));
        }

        let question = question.into_question();
        let options = serde_json::to_string(&question.options).map_err(|e| DbError::CorruptRow {
            table: "questions",
            message: format!("unencodable options: {e}"),
        })?;
        let sql = format!(
            "INSERT INTO questions ({QUESTION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        );
        sqlx::query(&sql)
            .bind(question.id.to_string())
            .bind(question.passage_id.to_string())
            .bind(&question.question_text)
            .bind(options)
            .bind(&question.correct_answer)
            .bind(question.explanation.as_deref())
            .bind(question.explanation_status.map(|s| s.as_str()))
            .bind(question.explanation_generated_at)
            .bind(question.explanation_error.as_deref())
            .bind(question.created_at)
            .execute(&self.pool)
            .await?;
        Ok(question)
    }

    async fn get_question(&self, id: Uuid) -> Result<Option<Question>, DbError> {
        let sql = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?");
        sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Question::try_from)
            .transpose()
    }

    async fn list_questions(&self, passage_id: Uuid) -> Result<Vec<Question>, DbError> {
        let sql = format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE passage_id = ? ORDER BY created_at, rowid"
        );
        sqlx::query_as::<_, QuestionRow>(&sql)
            .bind(passage_id.to_string())
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Question::try_from)
            .collect()
    }
}

#[async_trait]
impl QuestionStore for SqlQuestionRepository {
    async fn apply_explanation_update(
        &self,
        question_id: Uuid,
        update: ExplanationUpdate,
    ) -> Result<(), JobQueueError> {
        self.update_explanation(question_id, &update)
            .await
            .map_err(Into::into)
    }

    async fn explanation_state(
        &self,
        question_id: Uuid,
    ) -> Result<Option<ExplanationState>, JobQueueError> {
        let question = self.get_question(question_id).await?;
        Ok(question.as_ref().map(Question::explanation_state))
    }
}
