use quizdesk_db::NewQuestion;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{check_text, ValidationIssue};

pub const MAX_QUESTION_CHARS: usize = 2_000;
pub const MAX_OPTION_CHARS: usize = 500;
pub const MAX_EXPLANATION_CHARS: usize = 10_000;
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CreateQuestion {
    #[serde(alias = "questionText")]
    pub question_text: String,
    pub options: Vec<String>,
    #[serde(alias = "correctAnswer")]
    pub correct_answer: String,
    /// A hand-written explanation; when absent one is generated.
    #[serde(default)]
    pub explanation: Option<String>,
}

impl CreateQuestion {
    pub fn validate(&self) -> Result<(), Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        check_text(
            &mut issues,
            "questionText",
            &self.question_text,
            MAX_QUESTION_CHARS,
        );

        if self.options.len() < MIN_OPTIONS || self.options.len() > MAX_OPTIONS {
            issues.push(ValidationIssue::new(
                "options",
                "count",
                format!("between {MIN_OPTIONS} and {MAX_OPTIONS} options are required"),
            ));
        } else if self.options.iter().any(|o| o.trim().is_empty()) {
            issues.push(ValidationIssue::new(
                "options",
                "empty",
                "options must not be empty",
            ));
        } else if self
            .options
            .iter()
            .any(|o| o.trim().chars().count() > MAX_OPTION_CHARS)
        {
            issues.push(ValidationIssue::new(
                "options",
                "too_long",
                format!("each option must be <= {MAX_OPTION_CHARS} chars"),
            ));
        } else if has_duplicates(&self.options) {
            issues.push(ValidationIssue::new(
                "options",
                "duplicate",
                "options must be distinct",
            ));
        }

        let answer = self.correct_answer.trim();
        if answer.is_empty() {
            issues.push(ValidationIssue::new(
                "correctAnswer",
                "empty",
                "correctAnswer must not be empty",
            ));
        } else if !self.options.iter().any(|o| o.trim() == answer) {
            issues.push(ValidationIssue::new(
                "correctAnswer",
                "not_an_option",
                "correctAnswer must match one of the options",
            ));
        }

        if let Some(explanation) = &self.explanation {
            check_text(
                &mut issues,
                "explanation",
                explanation,
                MAX_EXPLANATION_CHARS,
            );
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    pub fn into_new_question(self, passage_id: Uuid) -> NewQuestion {
        NewQuestion {
            passage_id,
            question_text: self.question_text.trim().to_string(),
            options: self
                .options
                .into_iter()
                .map(|o| o.trim().to_string())
                .collect(),
            correct_answer: self.correct_answer.trim().to_string(),
            explanation: self.explanation.map(|e| e.trim().to_string()),
        }
    }
}

fn has_duplicates(options: &[String]) -> bool {
    options.iter().enumerate().any(|(i, a)| {
        options[i + 1..]
            .iter()
            .any(|b| a.trim().eq_ignore_ascii_case(b.trim()))
    })
}
