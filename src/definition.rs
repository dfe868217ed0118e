//! Per-field machine definitions.
//!
//! A definition is the capability set one tracked field supplies: its
//! transition table, default state, history policy, validation and hooks.
//! It is chosen once when a [`StateMachine`](crate::effects::StateMachine)
//! is built.

use crate::core::{Actor, State, TransitionTable};
use crate::effects::HookRegistry;
use crate::validation::Validator;

pub trait MachineDefinition<S: State, E>: Send + Sync {
    /// Legal transitions for `responsible`. Must be pure.
    fn transitions(&self, responsible: Option<&Actor>) -> TransitionTable<S>;

    /// State assigned to a fresh entity whose field is unset.
    fn default_state(&self) -> Option<S>;

    /// Whether committed transitions append history records.
    fn record_history(&self) -> bool;

    fn validator_for_transition(
        &self,
        _from: &S,
        _to: &S,
        _entity: &E,
        _responsible: Option<&Actor>,
    ) -> Option<Box<dyn Validator>> {
        None
    }

    fn before_hooks(&self, _responsible: Option<&Actor>) -> HookRegistry<S, E> {
        HookRegistry::new()
    }

    fn after_hooks(&self, _responsible: Option<&Actor>) -> HookRegistry<S, E> {
        HookRegistry::new()
    }
}
