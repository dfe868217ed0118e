//! The imperative shell around the pure core.
//!
//! This module runs the commit and scheduling protocols: it consults the
//! definition's table and validator, dispatches hooks, writes the entity,
//! appends history and maintains pending transitions.
//!
//! # Key Concepts
//!
//! - **StateMachine**: authorizes, commits and schedules transitions for one field
//! - **Hooks**: keyed side effects run before and after the field mutation
//! - **Errors**: a single `TransitionError` that tells callers whether the
//!   change was committed

mod error;
mod hooks;
mod machine;

pub use error::TransitionError;
pub use hooks::{Hook, HookKey, HookPhase, HookRegistry};
pub use machine::{StateMachine, TransitionOutcome};
