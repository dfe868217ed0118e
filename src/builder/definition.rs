//! Builder for table-driven machine definitions.

use crate::builder::error::BuildError;
use crate::core::{Actor, Guard, State, TransitionTable};
use crate::definition::MachineDefinition;
use crate::effects::HookRegistry;
use crate::validation::{RuleOutcome, TransitionContext, ValidationRules, Validator};

/// Rules scoped to one `(from, to)` pair, or to every transition.
struct ScopedRules<S: State, E> {
    scope: Option<(S, S)>,
    rules: ValidationRules<S, E>,
}

impl<S: State, E> ScopedRules<S, E> {
    fn applies(&self, from: &S, to: &S) -> bool {
        match &self.scope {
            Some((scope_from, scope_to)) => scope_from == from && scope_to == to,
            None => true,
        }
    }
}

/// Definition assembled by [`DefinitionBuilder`].
pub struct TableDefinition<S: State, E> {
    guard: Guard<S>,
    default_state: Option<S>,
    record_history: bool,
    rules: Vec<ScopedRules<S, E>>,
    before: HookRegistry<S, E>,
    after: HookRegistry<S, E>,
}

impl<S: State, E> MachineDefinition<S, E> for TableDefinition<S, E> {
    fn transitions(&self, responsible: Option<&Actor>) -> TransitionTable<S> {
        self.guard.resolve(responsible)
    }

    fn default_state(&self) -> Option<S> {
        self.default_state.clone()
    }

    fn record_history(&self) -> bool {
        self.record_history
    }

    fn validator_for_transition(
        &self,
        from: &S,
        to: &S,
        entity: &E,
        responsible: Option<&Actor>,
    ) -> Option<Box<dyn Validator>> {
        let context = TransitionContext::new(from, to, entity, responsible);
        let outcome = self
            .rules
            .iter()
            .filter(|scoped| scoped.applies(from, to))
            .map(|scoped| scoped.rules.validate(&context))
            .reduce(RuleOutcome::merge)?;
        Some(Box::new(outcome))
    }

    fn before_hooks(&self, _responsible: Option<&Actor>) -> HookRegistry<S, E> {
        self.before.clone()
    }

    fn after_hooks(&self, _responsible: Option<&Actor>) -> HookRegistry<S, E> {
        self.after.clone()
    }
}

/// Builder for constructing definitions with a fluent API.
///
/// # Example
///
/// ```rust
/// use statekeeper::builder::DefinitionBuilder;
/// use statekeeper::definition::MachineDefinition;
///
/// let definition = DefinitionBuilder::<String, ()>::new()
///     .allow("draft".to_string(), ["submitted".to_string()])
///     .allow(
///         "submitted".to_string(),
///         ["approved".to_string(), "rejected".to_string()],
///     )
///     .default_state("draft".to_string())
///     .record_history(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(definition.default_state(), Some("draft".to_string()));
/// assert!(definition
///     .transitions(None)
///     .contains(&"submitted".to_string(), &"rejected".to_string()));
/// ```
pub struct DefinitionBuilder<S: State, E> {
    table: TransitionTable<S>,
    guard: Option<Guard<S>>,
    default_state: Option<S>,
    record_history: bool,
    rules: Vec<ScopedRules<S, E>>,
    before: HookRegistry<S, E>,
    after: HookRegistry<S, E>,
}

impl<S: State, E> DefinitionBuilder<S, E> {
    /// Create a new builder. History recording starts disabled.
    pub fn new() -> Self {
        Self {
            table: TransitionTable::new(),
            guard: None,
            default_state: None,
            record_history: false,
            rules: Vec::new(),
            before: HookRegistry::new(),
            after: HookRegistry::new(),
        }
    }

    /// Allow moving from `from` to each of `targets`, for every actor.
    pub fn allow<I>(mut self, from: S, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        self.table = self.table.allow(from, targets);
        self
    }

    /// Resolve the table per actor instead of using a fixed one.
    pub fn resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(Option<&Actor>) -> TransitionTable<S> + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(resolver));
        self
    }

    pub fn default_state(mut self, state: S) -> Self {
        self.default_state = Some(state);
        self
    }

    pub fn record_history(mut self, enabled: bool) -> Self {
        self.record_history = enabled;
        self
    }

    /// Validate every transition with `rules`.
    pub fn validate(mut self, rules: ValidationRules<S, E>) -> Self {
        self.rules.push(ScopedRules { scope: None, rules });
        self
    }

    /// Validate only the `from -> to` transition with `rules`.
    pub fn validate_transition(mut self, from: S, to: S, rules: ValidationRules<S, E>) -> Self {
        self.rules.push(ScopedRules {
            scope: Some((from, to)),
            rules,
        });
        self
    }

    /// Run `hook` before leaving `state`.
    pub fn before<F>(mut self, state: S, hook: F) -> Self
    where
        F: Fn(&S, &S, &mut E) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.before = self.before.on(state, hook);
        self
    }

    /// Run `hook` before every transition.
    pub fn before_any<F>(mut self, hook: F) -> Self
    where
        F: Fn(&S, &S, &mut E) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.before = self.before.on_any(hook);
        self
    }

    /// Run `hook` after entering `state`.
    pub fn after<F>(mut self, state: S, hook: F) -> Self
    where
        F: Fn(&S, &S, &mut E) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.after = self.after.on(state, hook);
        self
    }

    /// Run `hook` after every transition.
    pub fn after_any<F>(mut self, hook: F) -> Self
    where
        F: Fn(&S, &S, &mut E) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.after = self.after.on_any(hook);
        self
    }

    /// Build the definition.
    pub fn build(self) -> Result<TableDefinition<S, E>, BuildError> {
        let guard = match (self.guard, self.table.is_empty()) {
            (Some(_), false) => return Err(BuildError::ConflictingTables),
            (Some(guard), true) => guard,
            (None, false) => Guard::fixed(self.table),
            (None, true) => return Err(BuildError::NoTransitions),
        };

        Ok(TableDefinition {
            guard,
            default_state: self.default_state,
            record_history: self.record_history,
            rules: self.rules,
            before: self.before,
            after: self.after,
        })
    }
}

impl<S: State, E> Default for DefinitionBuilder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}
