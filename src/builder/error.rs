//! Build errors for definition and state machine builders.

use thiserror::Error;

/// Errors that can occur when building definitions and state machines.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("Tracked field not specified. Call .field(name) before .build()")]
    MissingField,

    #[error("Tracked field name must not be empty")]
    EmptyField,

    #[error("Definition not specified. Call .definition(def) before .build()")]
    MissingDefinition,

    #[error("No transitions defined. Call .allow(from, targets) or .resolver(f)")]
    NoTransitions,

    #[error("Both a fixed table and a resolver were given; use one")]
    ConflictingTables,
}
