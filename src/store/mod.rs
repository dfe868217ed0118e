//! Collaborator contracts the engine persists through.
//!
//! Each contract is a trait so embedders can back it with their own
//! database. The `Memory*` types are thread-safe in-memory implementations
//! sharing state across clones; they back the tests and suit single-process
//! use.

mod entity;
mod error;
mod history;
mod identity;
mod pending;

pub use entity::{MemoryEntity, MemoryTable, SaveGuard, StatefulEntity};
pub use error::PersistError;
pub use history::{HistoryStore, MemoryHistoryStore};
pub use identity::{FixedIdentity, IdentityProvider, NoIdentity};
pub use pending::{MemoryPendingStore, PendingStore};
