use quizdesk_db::NewPassage;
use serde::{Deserialize, Serialize};

use crate::validation::{check_text, ValidationIssue};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CONTENT_CHARS: usize = 50_000;
pub const MAX_COMMENT_CHARS: usize = 2_000;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CreatePassage {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub comment: Option<String>,
}

impl CreatePassage {
    pub fn validate(&self) -> Result<(), Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        check_text(&mut issues, "title", &self.title, MAX_TITLE_CHARS);
        check_text(&mut issues, "content", &self.content, MAX_CONTENT_CHARS);
        if let Some(comment) = &self.comment {
            if comment.trim().chars().count() > MAX_COMMENT_CHARS {
                issues.push(ValidationIssue::new(
                    "comment",
                    "too_long",
                    format!("comment must be <= {MAX_COMMENT_CHARS} chars"),
                ));
            }
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    /// Trimmed record for storage; a blank comment is dropped.
    pub fn into_new_passage(self) -> NewPassage {
        NewPassage {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            comment: self
                .comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        }
    }
}
