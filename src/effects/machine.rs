//! State machine that authorizes, commits and schedules transitions.

use crate::core::{
    Actor, Attributes, HistoryRecord, NewHistoryRecord, NewPendingTransition, PendingTransition,
    State, StateHistory,
};
use crate::definition::MachineDefinition;
use crate::effects::error::TransitionError;
use crate::effects::hooks::HookPhase;
use crate::store::{
    HistoryStore, IdentityProvider, PendingStore, PersistError, SaveGuard, StatefulEntity,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Result of a successful `transition_to`.
#[derive(Clone, Debug, PartialEq)]
pub enum TransitionOutcome<S: State> {
    /// The field already held the target state; nothing ran.
    Unchanged,

    /// The new state was persisted.
    Committed {
        /// The audit record, when the definition records history.
        history: Option<HistoryRecord<S>>,
        /// Pending transitions removed for the field.
        cancelled: usize,
    },
}

impl<S: State> TransitionOutcome<S> {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Guarded state machine bound to one tracked field.
///
/// The machine holds no entity state of its own: every operation takes the
/// entity it acts on, so one machine serves every row of an entity type.
pub struct StateMachine<S: State, E: StatefulEntity<S>> {
    field: String,
    definition: Arc<dyn MachineDefinition<S, E>>,
    history: Arc<dyn HistoryStore<S>>,
    pending: Arc<dyn PendingStore<S>>,
    identity: Arc<dyn IdentityProvider>,
}

impl<S: State, E: StatefulEntity<S>> Clone for StateMachine<S, E> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            definition: Arc::clone(&self.definition),
            history: Arc::clone(&self.history),
            pending: Arc::clone(&self.pending),
            identity: Arc::clone(&self.identity),
        }
    }
}

impl<S: State, E: StatefulEntity<S>> StateMachine<S, E> {
    /// Create a machine from its parts. See
    /// [`StateMachineBuilder`](crate::builder::StateMachineBuilder) for the
    /// fluent form.
    pub fn new(
        field: impl Into<String>,
        definition: Arc<dyn MachineDefinition<S, E>>,
        history: Arc<dyn HistoryStore<S>>,
        pending: Arc<dyn PendingStore<S>>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            field: field.into(),
            definition,
            history,
            pending,
            identity,
        }
    }

    /// Name of the tracked field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The definition supplying tables, validation and hooks.
    pub fn definition(&self) -> &dyn MachineDefinition<S, E> {
        self.definition.as_ref()
    }

    /// Get current state of the tracked field (pure)
    pub fn current_state(&self, entity: &E) -> Option<S> {
        entity.get(&self.field)
    }

    /// Assign the default state to an entity whose field is unset.
    ///
    /// Does not save; returns the state now held by the field.
    pub fn initialize(&self, entity: &mut E) -> Option<S> {
        if let Some(current) = self.current_state(entity) {
            return Some(current);
        }
        let default = self.definition.default_state()?;
        entity.set(&self.field, default.clone());
        Some(default)
    }

    fn resolve(&self, responsible: Option<Actor>) -> Option<Actor> {
        responsible.or_else(|| self.identity.current_actor())
    }

    /// Whether `to` is a legal target from `from` for `responsible`.
    pub fn can_be(&self, from: &S, to: &S, responsible: Option<&Actor>) -> bool {
        self.definition.transitions(responsible).contains(from, to)
    }

    /// Targets reachable from the entity's current state.
    ///
    /// Falls back to the identity provider when `responsible` is `None`.
    pub fn valid_transitions(&self, entity: &E, responsible: Option<Actor>) -> Vec<S> {
        let responsible = self.resolve(responsible);
        match self.current_state(entity) {
            Some(current) => self
                .definition
                .transitions(responsible.as_ref())
                .targets(&current)
                .to_vec(),
            None => Vec::new(),
        }
    }

    /// Move the tracked field from `from` to `to` and persist it.
    ///
    /// Moving to the state the field already holds is a no-op that skips
    /// authorization, hooks and history. Otherwise the move must be in the
    /// actor's table and pass validation; before-hooks keyed on `from` run
    /// ahead of the save, after-hooks keyed on `to` run behind it, and all
    /// pending transitions for the field are deleted last.
    ///
    /// The save is conditioned on the field still holding the value the
    /// entity was loaded with. Errors raised after it succeeds (history,
    /// after-hooks, pending cleanup) are returned with
    /// [`TransitionError::committed`] set: the new state is durable but the
    /// remaining steps did not run.
    pub fn transition_to(
        &self,
        entity: &mut E,
        from: &S,
        to: &S,
        custom_properties: Attributes,
        responsible: Option<Actor>,
    ) -> Result<TransitionOutcome<S>, TransitionError> {
        let responsible = self.resolve(responsible);
        let entity_ref = entity.entity_ref();
        let current = self.current_state(entity);

        if current.as_ref() == Some(to) {
            tracing::trace!(
                entity = %entity_ref,
                field = %self.field,
                state = to.name(),
                "already in target state"
            );
            return Ok(TransitionOutcome::Unchanged);
        }

        if !self.can_be(from, to, responsible.as_ref()) {
            return Err(TransitionError::NotAllowed {
                from: from.name().to_string(),
                to: to.name().to_string(),
            });
        }

        if let Some(validator) =
            self.definition
                .validator_for_transition(from, to, entity, responsible.as_ref())
        {
            if validator.fails() {
                return Err(TransitionError::ValidationFailed {
                    from: from.name().to_string(),
                    to: to.name().to_string(),
                    errors: validator.errors(),
                });
            }
        }

        self.definition
            .before_hooks(responsible.as_ref())
            .dispatch(from, from, to, entity)
            .map_err(|source| TransitionError::Hook {
                phase: HookPhase::Before,
                source,
            })?;

        entity.set(&self.field, to.clone());
        let changed_attributes = entity.changed_attributes();

        let guard = SaveGuard {
            field: self.field.clone(),
            expected: entity.loaded(&self.field),
        };
        if let Err(err) = entity.save(&guard) {
            match current {
                Some(previous) => entity.set(&self.field, previous),
                None => entity.unset(&self.field),
            }
            return Err(err.into());
        }

        let history = if self.definition.record_history() {
            let record = self
                .history
                .record(NewHistoryRecord {
                    entity: entity_ref.clone(),
                    field: self.field.clone(),
                    from: from.clone(),
                    to: to.clone(),
                    custom_properties,
                    responsible: responsible.clone(),
                    changed_attributes,
                    timestamp: Utc::now(),
                })
                .map_err(TransitionError::AfterCommit)?;
            Some(record)
        } else {
            None
        };

        self.definition
            .after_hooks(responsible.as_ref())
            .dispatch(to, from, to, entity)
            .map_err(|source| TransitionError::Hook {
                phase: HookPhase::After,
                source,
            })?;

        let cancelled = self
            .cancel_all_pending_transitions(entity)
            .map_err(TransitionError::AfterCommit)?;

        tracing::debug!(
            entity = %entity_ref,
            field = %self.field,
            from = from.name(),
            to = to.name(),
            cancelled,
            "transition committed"
        );

        Ok(TransitionOutcome::Committed { history, cancelled })
    }

    /// Record an intent to move from `from` to `to` at `when`.
    ///
    /// Returns `None` without recording anything when the field already
    /// holds `to`. Only authorization runs now; validation, hooks and
    /// history run when the scheduler applies the record.
    pub fn postpone_transition_to(
        &self,
        entity: &E,
        from: &S,
        to: &S,
        when: DateTime<Utc>,
        custom_properties: Attributes,
        responsible: Option<Actor>,
    ) -> Result<Option<PendingTransition<S>>, TransitionError> {
        if self.current_state(entity).as_ref() == Some(to) {
            return Ok(None);
        }

        let responsible = self.resolve(responsible);

        if !self.can_be(from, to, responsible.as_ref()) {
            return Err(TransitionError::NotAllowed {
                from: from.name().to_string(),
                to: to.name().to_string(),
            });
        }

        let pending = self.pending.create(NewPendingTransition {
            entity: entity.entity_ref(),
            field: self.field.clone(),
            from: from.clone(),
            to: to.clone(),
            transition_at: when,
            custom_properties,
            responsible,
        })?;

        tracing::debug!(
            entity = %pending.entity,
            field = %self.field,
            from = from.name(),
            to = to.name(),
            transition_at = %when,
            "transition postponed"
        );

        Ok(Some(pending))
    }

    /// Commit a due pending transition on behalf of a scheduler.
    ///
    /// Marks the record applied, then runs the full `transition_to` protocol
    /// with the record's states, properties and actor.
    pub fn apply_pending_transition(
        &self,
        entity: &mut E,
        pending: &PendingTransition<S>,
    ) -> Result<TransitionOutcome<S>, TransitionError> {
        let entity_ref = entity.entity_ref();
        if pending.entity != entity_ref || pending.field != self.field {
            return Err(PersistError::NotFound(format!(
                "pending transition {} for {}.{}",
                pending.id, entity_ref, self.field
            ))
            .into());
        }

        self.pending.mark_applied(pending.id, Utc::now())?;

        self.transition_to(
            entity,
            &pending.from,
            &pending.to,
            pending.custom_properties.clone(),
            pending.responsible.clone(),
        )
    }

    /// Delete every pending transition for the field, applied or not.
    ///
    /// Idempotent; safe to call again after an after-hook failure.
    pub fn cancel_all_pending_transitions(&self, entity: &E) -> Result<usize, PersistError> {
        let entity_ref = entity.entity_ref();
        let cancelled = self.pending.delete_all_for(&entity_ref, &self.field)?;
        if cancelled > 0 {
            tracing::debug!(
                entity = %entity_ref,
                field = %self.field,
                cancelled,
                "pending transitions cancelled"
            );
        }
        Ok(cancelled)
    }

    /// All history records for the field, in recorded order.
    pub fn history(&self, entity: &E) -> Result<StateHistory<S>, PersistError> {
        let records = self.history.for_field(&entity.entity_ref(), &self.field)?;
        Ok(StateHistory::from_records(records))
    }

    /// Whether the field has ever been moved into `state`.
    pub fn was(&self, entity: &E, state: &S) -> Result<bool, PersistError> {
        Ok(self.history(entity)?.was(state))
    }

    /// How many committed transitions ended in `state`.
    pub fn times_was(&self, entity: &E, state: &S) -> Result<usize, PersistError> {
        Ok(self.history(entity)?.times_was(state))
    }

    /// Timestamp of the latest move into `state`, if any.
    pub fn when_was(&self, entity: &E, state: &S) -> Result<Option<DateTime<Utc>>, PersistError> {
        Ok(self.history(entity)?.when_was(state))
    }

    /// The latest history record that moved into `state`.
    pub fn snapshot_when(
        &self,
        entity: &E,
        state: &S,
    ) -> Result<Option<HistoryRecord<S>>, PersistError> {
        Ok(self.history(entity)?.snapshot_when(state).cloned())
    }

    /// Every history record that moved into `state`, oldest first.
    pub fn snapshots_when(
        &self,
        entity: &E,
        state: &S,
    ) -> Result<Vec<HistoryRecord<S>>, PersistError> {
        Ok(self
            .history(entity)?
            .snapshots_when(state)
            .into_iter()
            .cloned()
            .collect())
    }

    /// All pending transitions for the field, applied or not.
    pub fn pending_transitions(&self, entity: &E) -> Result<Vec<PendingTransition<S>>, PersistError> {
        self.pending.all_for(&entity.entity_ref(), &self.field)
    }

    /// Whether any pending transition for the field is not yet applied.
    pub fn has_pending_transitions(&self, entity: &E) -> Result<bool, PersistError> {
        Ok(self
            .pending_transitions(entity)?
            .iter()
            .any(|pending| !pending.is_applied()))
    }
}
