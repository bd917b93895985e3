use chrono::{DateTime, Utc};
use quizdesk_job_queue::{ExplanationState, ExplanationStatus, ExplanationUpdate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passage {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub passage_id: Uuid,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    /// `None` when the explanation was written by hand.
    pub explanation_status: Option<ExplanationStatus>,
    pub explanation_generated_at: Option<DateTime<Utc>>,
    pub explanation_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn explanation_state(&self) -> ExplanationState {
        ExplanationState {
            status: self.explanation_status,
            generated_at: self.explanation_generated_at,
            error: self.explanation_error.clone(),
        }
    }

    /// Apply a queue write to the explanation fields.
    pub fn apply(&mut self, update: ExplanationUpdate) {
        self.explanation_status = Some(update.status());
        match update {
            ExplanationUpdate::Pending => self.explanation_error = None,
            ExplanationUpdate::Generating => {}
            ExplanationUpdate::Completed {
                explanation,
                generated_at,
            } => {
                self.explanation = Some(explanation);
                self.explanation_generated_at = Some(generated_at);
                self.explanation_error = None;
            }
            ExplanationUpdate::Failed { error } => self.explanation_error = Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPassage {
    pub title: String,
    pub content: String,
    pub comment: Option<String>,
}

impl NewPassage {
    pub fn into_passage(self) -> Passage {
        Passage {
            id: Uuid::new_v4(),
            title: self.title,
            content: self.content,
            comment: self.comment,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuestion {
    pub passage_id: Uuid,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: Option<String>,
}

impl NewQuestion {
    /// Build the stored record. Questions without an explanation start out `pending`.
    pub fn into_question(self) -> Question {
        let explanation_status = match self.explanation {
            Some(_) => None,
            None => Some(ExplanationStatus::Pending),
        };
        Question {
            id: Uuid::new_v4(),
            passage_id: self.passage_id,
            question_text: self.question_text,
            options: self.options,
            correct_answer: self.correct_answer,
            explanation: self.explanation,
            explanation_status,
            explanation_generated_at: None,
            explanation_error: None,
            created_at: Utc::now(),
        }
    }
}

/// A passage together with its questions in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassageWithQuestions {
    #[serde(flatten)]
    pub passage: Passage,
    pub questions: Vec<Question>,
}
