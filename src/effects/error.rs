//! Errors raised by the commit and scheduling protocols.

use crate::effects::hooks::HookPhase;
use crate::store::PersistError;
use crate::validation::ValidationError;
use thiserror::Error;

/// Errors that can occur during transitions
#[derive(Debug, Error)]
pub enum TransitionError {
    /// The target is not reachable from `from` for this actor.
    #[error("Transition from '{from}' to '{to}' is not allowed")]
    NotAllowed { from: String, to: String },

    #[error("Transition from '{from}' to '{to}' failed validation: {}", join(.errors))]
    ValidationFailed {
        from: String,
        to: String,
        errors: Vec<ValidationError>,
    },

    /// A hook returned an error. After-phase failures happen once the new
    /// state is persisted.
    #[error("{phase}-transition hook failed: {source}")]
    Hook {
        phase: HookPhase,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Persist(#[from] PersistError),

    /// A store failed after the new state was saved.
    #[error("Transition saved, but a follow-up write failed: {0}")]
    AfterCommit(#[source] PersistError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl TransitionError {
    /// Whether the state change was persisted before this error surfaced.
    ///
    /// After-hook failures and follow-up store failures leave the
    /// transition committed; history or pending cleanup may be missing.
    pub fn committed(&self) -> bool {
        matches!(
            self,
            Self::Hook {
                phase: HookPhase::After,
                ..
            } | Self::AfterCommit(_)
        )
    }

    /// Validation errors, if this is a validation failure.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::ValidationFailed { errors, .. } => errors,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_save_failures_are_committed() {
        let after = TransitionError::Hook {
            phase: HookPhase::After,
            source: anyhow::anyhow!("mail server down"),
        };
        let before = TransitionError::Hook {
            phase: HookPhase::Before,
            source: anyhow::anyhow!("mail server down"),
        };
        assert!(after.committed());
        assert!(!before.committed());
        assert!(TransitionError::AfterCommit(PersistError::Backend("down".into())).committed());
        assert!(!TransitionError::Persist(PersistError::Backend("down".into())).committed());
        assert!(!TransitionError::NotAllowed {
            from: "a".into(),
            to: "b".into()
        }
        .committed());
    }

    #[test]
    fn validation_message_lists_every_error() {
        let err = TransitionError::ValidationFailed {
            from: "draft".into(),
            to: "submitted".into(),
            errors: vec![
                ValidationError::on_field("title", "is required"),
                ValidationError::new("attachments missing"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Transition from 'draft' to 'submitted' failed validation: title: is required; attachments missing"
        );
        assert_eq!(err.validation_errors().len(), 2);
    }

    #[test]
    fn hook_error_names_phase() {
        let err = TransitionError::Hook {
            phase: HookPhase::Before,
            source: anyhow::anyhow!("locked"),
        };
        assert_eq!(err.to_string(), "before-transition hook failed: locked");
    }
}
