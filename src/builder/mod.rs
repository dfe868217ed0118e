//! Builder API for ergonomic state machine construction.
//!
//! This module provides fluent builders and macros for declaring states,
//! definitions and machines with minimal boilerplate.

pub mod definition;
pub mod error;
pub mod machine;
pub mod macros;

pub use definition::{DefinitionBuilder, TableDefinition};
pub use error::BuildError;
pub use machine::StateMachineBuilder;

use crate::core::{State, TransitionTable};

/// Build a transition table from `(from, targets)` pairs.
///
/// # Example
///
/// ```
/// use statekeeper::builder::table_from;
///
/// let table = table_from([
///     ("draft".to_string(), vec!["submitted".to_string()]),
///     ("submitted".to_string(), vec!["approved".to_string()]),
/// ]);
///
/// assert!(table.contains(&"draft".to_string(), &"submitted".to_string()));
/// ```
pub fn table_from<S, I, T>(entries: I) -> TransitionTable<S>
where
    S: State,
    I: IntoIterator<Item = (S, T)>,
    T: IntoIterator<Item = S>,
{
    entries
        .into_iter()
        .fold(TransitionTable::new(), |table, (from, targets)| {
            table.allow(from, targets)
        })
}
