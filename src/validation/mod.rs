//! Validation bridge for transitions.
//!
//! The engine only consumes the pass/fail contract of [`Validator`]. Any
//! validation engine can be plugged in by implementing it; the built-in
//! [`ValidationRules`] use Stillwater's `Validation` type to accumulate ALL
//! failures instead of stopping at the first one.
//!
//! # Example
//!
//! ```rust
//! use statekeeper::validation::{RulesBuilder, TransitionContext, Validator};
//!
//! struct Order {
//!     items: usize,
//! }
//!
//! let rules = RulesBuilder::<String, Order>::new()
//!     .require_field("items", |ctx| ctx.entity.items > 0, "order is empty")
//!     .build();
//!
//! let (from, to) = ("cart".to_string(), "placed".to_string());
//! let outcome = rules.validate(&TransitionContext::new(&from, &to, &Order { items: 0 }, None));
//! assert!(outcome.fails());
//! ```

pub mod builder;
pub mod context;
pub mod rules;
pub mod violations;

pub use builder::RulesBuilder;
pub use context::TransitionContext;
pub use rules::{RuleOutcome, ValidationRules};
pub use violations::ValidationError;

/// Outcome of validating one requested transition.
pub trait Validator {
    fn fails(&self) -> bool;

    fn errors(&self) -> Vec<ValidationError>;
}
