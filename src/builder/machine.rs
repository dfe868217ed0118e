//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::core::State;
use crate::definition::MachineDefinition;
use crate::effects::StateMachine;
use crate::store::{
    HistoryStore, IdentityProvider, MemoryHistoryStore, MemoryPendingStore, NoIdentity,
    PendingStore, StatefulEntity,
};
use std::sync::Arc;

/// Builder for constructing state machines with a fluent API.
///
/// Stores default to fresh in-memory ones and the identity provider to
/// [`NoIdentity`]; the tracked field and the definition are required.
pub struct StateMachineBuilder<S: State, E: StatefulEntity<S>> {
    field: Option<String>,
    definition: Option<Arc<dyn MachineDefinition<S, E>>>,
    history: Option<Arc<dyn HistoryStore<S>>>,
    pending: Option<Arc<dyn PendingStore<S>>>,
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl<S: State, E: StatefulEntity<S>> StateMachineBuilder<S, E> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            field: None,
            definition: None,
            history: None,
            pending: None,
            identity: None,
        }
    }

    /// Set the tracked field (required).
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.field = Some(name.into());
        self
    }

    /// Set the definition (required).
    pub fn definition<D>(self, definition: D) -> Self
    where
        D: MachineDefinition<S, E> + 'static,
    {
        self.shared_definition(Arc::new(definition))
    }

    /// Set a definition shared with other machines.
    pub fn shared_definition(mut self, definition: Arc<dyn MachineDefinition<S, E>>) -> Self {
        self.definition = Some(definition);
        self
    }

    pub fn history_store(mut self, store: Arc<dyn HistoryStore<S>>) -> Self {
        self.history = Some(store);
        self
    }

    pub fn pending_store(mut self, store: Arc<dyn PendingStore<S>>) -> Self {
        self.pending = Some(store);
        self
    }

    pub fn identity(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(provider);
        self
    }

    /// Build the state machine.
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<StateMachine<S, E>, BuildError> {
        let field = self.field.ok_or(BuildError::MissingField)?;
        if field.trim().is_empty() {
            return Err(BuildError::EmptyField);
        }
        let definition = self.definition.ok_or(BuildError::MissingDefinition)?;

        let history: Arc<dyn HistoryStore<S>> = match self.history {
            Some(store) => store,
            None => Arc::new(MemoryHistoryStore::new()),
        };
        let pending: Arc<dyn PendingStore<S>> = match self.pending {
            Some(store) => store,
            None => Arc::new(MemoryPendingStore::new()),
        };
        let identity: Arc<dyn IdentityProvider> = match self.identity {
            Some(provider) => provider,
            None => Arc::new(NoIdentity),
        };

        Ok(StateMachine::new(
            field, definition, history, pending, identity,
        ))
    }
}

impl<S: State, E: StatefulEntity<S>> Default for StateMachineBuilder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}
