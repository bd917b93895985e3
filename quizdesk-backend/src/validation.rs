use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Group issues by field. Later issues for the same field replace earlier ones.
pub fn to_payload(issues: &[ValidationIssue]) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for issue in issues {
        map.insert(
            issue.field.clone(),
            serde_json::json!({ "code": issue.code, "message": issue.message }),
        );
    }
    serde_json::json!({ "validation": serde_json::Value::Object(map) })
}

/// Shared checks for required free-text fields.
pub(crate) fn check_text(
    issues: &mut Vec<ValidationIssue>,
    field: &str,
    value: &str,
    max_chars: usize,
) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        issues.push(ValidationIssue::new(
            field,
            "empty",
            format!("{field} must not be empty"),
        ));
    } else if trimmed.chars().count() > max_chars {
        issues.push(ValidationIssue::new(
            field,
            "too_long",
            format!("{field} must be <= {max_chars} chars"),
        ));
    }
}
