//! Persistence error types.

use thiserror::Error;

/// Errors surfaced by entity and record stores.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PersistError {
    /// The tracked field changed underneath us since it was read.
    #[error("Conflicting write on {entity}.{field}: expected {expected:?}, found {found:?}")]
    Conflict {
        entity: String,
        field: String,
        expected: Option<String>,
        found: Option<String>,
    },

    #[error("Record not found: {0}")]
    NotFound(String),

    /// Storage backend failure, passed through verbatim.
    #[error("Storage backend failed: {0}")]
    Backend(String),
}
