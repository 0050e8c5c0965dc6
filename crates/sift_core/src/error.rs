//! Error returned by `parse` when validation fails.

use crate::Issue;
use thiserror::Error;

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Validation failed; carries every issue of the run.
///
/// The error text is the first issue's message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Message of the first issue
    pub message: String,

    /// Every issue, in traversal order
    pub issues: Vec<Issue>,
}

impl ValidationError {
    /// Creates a new validation error from the issues of a failed run.
    pub fn new(issues: Vec<Issue>) -> Self {
        let message = issues
            .first()
            .map(|issue| issue.message.clone())
            .unwrap_or_else(|| "Validation failed".to_string());
        Self { message, issues }
    }

    /// Returns the first issue.
    pub fn first(&self) -> Option<&Issue> {
        self.issues.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IssueKind, Value};

    #[test]
    fn test_display_uses_first_message() {
        let issue = Issue {
            kind: IssueKind::Schema,
            issue_type: "string",
            input: Value::from(1),
            expected: Some("string".to_string()),
            received: "1".to_string(),
            message: "Invalid type: Expected string but received 1".to_string(),
            requirement: None,
            path: None,
            issues: None,
            lang: None,
            pending: None,
        };
        let mut second = issue.clone();
        second.message = "second".to_string();

        let error = ValidationError::new(vec![issue, second]);
        assert_eq!(
            error.to_string(),
            "Invalid type: Expected string but received 1"
        );
        assert_eq!(error.issues.len(), 2);
    }

    #[test]
    fn test_empty_issue_list() {
        assert_eq!(ValidationError::new(vec![]).to_string(), "Validation failed");
    }
}
