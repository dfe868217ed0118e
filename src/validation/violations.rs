//! Structured validation errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One failed check. `field` names the offending attribute when the check
/// is about a single one.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{}", render(.field, .message))]
pub struct ValidationError {
    pub field: Option<String>,
    pub message: String,
}

fn render(field: &Option<String>, message: &str) -> String {
    match field {
        Some(field) => format!("{field}: {message}"),
        None => message.to_string(),
    }
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn on_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_field_when_present() {
        assert_eq!(
            ValidationError::on_field("total", "must be positive").to_string(),
            "total: must be positive"
        );
        assert_eq!(ValidationError::new("not ready").to_string(), "not ready");
    }
}
