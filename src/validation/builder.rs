//! Builder API for creating validation rules.

use crate::core::State;
use crate::validation::context::TransitionContext;
use crate::validation::rules::{ValidationCheck, ValidationRules};
use crate::validation::violations::ValidationError;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for creating validation rules
pub struct RulesBuilder<S: State, E> {
    checks: Vec<ValidationCheck<S, E>>,
}

impl<S: State, E: 'static> RulesBuilder<S, E> {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Add a custom validation check
    pub fn require<F>(mut self, check: F) -> Self
    where
        F: Fn(&TransitionContext<'_, S, E>) -> Validation<(), NonEmptyVec<ValidationError>>
            + Send
            + Sync
            + 'static,
    {
        self.checks.push(Box::new(check));
        self
    }

    /// Add a simple predicate check with error message
    pub fn require_pred<F>(self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&TransitionContext<'_, S, E>) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        self.require(move |ctx: &TransitionContext<'_, S, E>| {
            if predicate(ctx) {
                Validation::success(())
            } else {
                Validation::fail(ValidationError::new(message.clone()))
            }
        })
    }

    /// Add a predicate check whose failure is attributed to `field`
    pub fn require_field<F>(
        self,
        field: impl Into<String>,
        predicate: F,
        message: impl Into<String>,
    ) -> Self
    where
        F: Fn(&TransitionContext<'_, S, E>) -> bool + Send + Sync + 'static,
    {
        let field = field.into();
        let message = message.into();
        self.require(move |ctx: &TransitionContext<'_, S, E>| {
            if predicate(ctx) {
                Validation::success(())
            } else {
                Validation::fail(ValidationError::on_field(field.clone(), message.clone()))
            }
        })
    }

    /// Build the validation rules
    pub fn build(self) -> ValidationRules<S, E> {
        ValidationRules {
            checks: self.checks,
        }
    }
}

impl<S: State, E: 'static> Default for RulesBuilder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}
