//! Core state machine types and logic.
//!
//! This module contains the pure data of the engine:
//! - State definitions via the `State` trait
//! - Transition tables and the role-aware `Guard` that resolves them
//! - Immutable history records and the `StateHistory` query view
//! - Pending transition records
//!
//! Nothing in here performs I/O; stores and the orchestrator live in
//! `store` and `effects`.

mod actor;
mod guard;
mod history;
mod pending;
mod state;
mod table;

pub use actor::{Actor, Attributes, EntityRef};
pub use guard::Guard;
pub use history::{HistoryRecord, NewHistoryRecord, StateHistory};
pub use pending::{NewPendingTransition, PendingTransition};
pub use state::State;
pub use table::TransitionTable;
