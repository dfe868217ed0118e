//! Validation rules for transitions using Validation.

use crate::core::State;
use crate::validation::context::TransitionContext;
use crate::validation::violations::ValidationError;
use crate::validation::Validator;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Type alias for validation check functions
pub type ValidationCheck<S, E> = Box<
    dyn Fn(&TransitionContext<'_, S, E>) -> Validation<(), NonEmptyVec<ValidationError>>
        + Send
        + Sync,
>;

/// A set of checks run against a requested transition.
/// Uses Validation to accumulate ALL failures rather than stopping at the first.
pub struct ValidationRules<S: State, E> {
    pub(crate) checks: Vec<ValidationCheck<S, E>>,
}

impl<S: State, E> ValidationRules<S, E> {
    /// Run every check, collecting every failure.
    pub fn validate(&self, context: &TransitionContext<'_, S, E>) -> RuleOutcome {
        let results: Vec<Validation<(), NonEmptyVec<ValidationError>>> =
            self.checks.iter().map(|check| check(context)).collect();

        match Validation::all_vec(results) {
            Validation::Success(_) => RuleOutcome::default(),
            Validation::Failure(errors) => RuleOutcome {
                errors: errors.iter().cloned().collect(),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

/// Result of running [`ValidationRules`]; plugs into the commit path as a
/// [`Validator`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleOutcome {
    errors: Vec<ValidationError>,
}

impl RuleOutcome {
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    /// Combine with another outcome, keeping both error lists in order.
    pub fn merge(mut self, other: RuleOutcome) -> Self {
        self.errors.extend(other.errors);
        self
    }
}

impl Validator for RuleOutcome {
    fn fails(&self) -> bool {
        !self.errors.is_empty()
    }

    fn errors(&self) -> Vec<ValidationError> {
        self.errors.clone()
    }
}
