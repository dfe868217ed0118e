//! Statekeeper: guarded state transitions for one tracked entity field
//!
//! Statekeeper keeps the decision logic pure and pushes persistence to the
//! edges. Transition tables, guards and history queries are plain values;
//! the [`StateMachine`](effects::StateMachine) orchestrator is the only
//! place that mutates entities or talks to stores.
//!
//! # Core Concepts
//!
//! - **State**: Type-safe state representation via the `State` trait
//! - **Guard**: Per-actor transition tables deciding what is legal
//! - **Validation**: Pluggable pass/fail checks run before a commit
//! - **Hooks**: Before/after side effects keyed by state or wildcard
//! - **History**: Append-only audit records of committed transitions
//! - **Pending transitions**: Scheduled intents cancelled by any commit
//!
//! # Example
//!
//! ```rust
//! use statekeeper::builder::{DefinitionBuilder, StateMachineBuilder};
//! use statekeeper::core::Attributes;
//! use statekeeper::store::{MemoryEntity, MemoryTable};
//! use statekeeper::state_enum;
//! use std::collections::BTreeMap;
//!
//! state_enum! {
//!     pub enum Status {
//!         Draft = "draft",
//!         Submitted = "submitted",
//!         Approved = "approved",
//!     }
//! }
//!
//! let definition = DefinitionBuilder::<Status, MemoryEntity<Status>>::new()
//!     .allow(Status::Draft, [Status::Submitted])
//!     .allow(Status::Submitted, [Status::Approved])
//!     .default_state(Status::Draft)
//!     .record_history(true)
//!     .build()
//!     .unwrap();
//!
//! let machine = StateMachineBuilder::<Status, MemoryEntity<Status>>::new()
//!     .field("status")
//!     .definition(definition)
//!     .build()
//!     .unwrap();
//!
//! let table = MemoryTable::new("document");
//! let mut document = table.insert("1", BTreeMap::new(), Attributes::new());
//! machine.initialize(&mut document);
//!
//! machine
//!     .transition_to(&mut document, &Status::Draft, &Status::Submitted, Attributes::new(), None)
//!     .unwrap();
//!
//! assert_eq!(machine.current_state(&document), Some(Status::Submitted));
//! assert_eq!(machine.times_was(&document, &Status::Submitted).unwrap(), 1);
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod definition;
pub mod effects;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use builder::{BuildError, DefinitionBuilder, StateMachineBuilder};
pub use core::{Actor, Attributes, EntityRef, HistoryRecord, PendingTransition, State};
pub use definition::MachineDefinition;
pub use effects::{StateMachine, TransitionError, TransitionOutcome};
pub use store::{PersistError, StatefulEntity};
