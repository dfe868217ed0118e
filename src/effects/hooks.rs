//! Before/after transition hooks.

use crate::core::State;
use std::fmt;
use std::sync::Arc;

/// Side effect run around a transition: `(from, to, entity)`.
pub type Hook<S, E> = Arc<dyn Fn(&S, &S, &mut E) -> anyhow::Result<()> + Send + Sync>;

/// Which state a hook is registered under.
#[derive(Clone, Debug, PartialEq)]
pub enum HookKey<S: State> {
    Exact(S),
    /// Fires on every transition.
    Wildcard,
}

impl<S: State> HookKey<S> {
    pub fn matches(&self, state: &S) -> bool {
        match self {
            Self::Exact(key) => key == state,
            Self::Wildcard => true,
        }
    }
}

/// When a hook ran relative to the field mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookPhase {
    Before,
    After,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => f.write_str("before"),
            Self::After => f.write_str("after"),
        }
    }
}

/// Ordered list of keyed hooks.
///
/// Exact and wildcard entries share one list; dispatch preserves
/// registration order across both.
///
/// # Example
///
/// ```rust
/// use statekeeper::effects::HookRegistry;
///
/// let registry: HookRegistry<String, Vec<String>> = HookRegistry::new()
///     .on("submitted".to_string(), |_from: &String, to: &String, log: &mut Vec<String>| {
///         log.push(format!("exact {to}"));
///         Ok(())
///     })
///     .on_any(|_from: &String, to: &String, log: &mut Vec<String>| {
///         log.push(format!("any {to}"));
///         Ok(())
///     });
///
/// let mut log = Vec::new();
/// let (from, to) = ("draft".to_string(), "submitted".to_string());
/// registry.dispatch(&to, &from, &to, &mut log).unwrap();
/// assert_eq!(log, vec!["exact submitted", "any submitted"]);
/// ```
pub struct HookRegistry<S: State, E> {
    entries: Vec<(HookKey<S>, Hook<S, E>)>,
}

impl<S: State, E> Clone for HookRegistry<S, E> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<S: State, E> Default for HookRegistry<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, E> HookRegistry<S, E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(mut self, key: HookKey<S>, hook: Hook<S, E>) -> Self {
        self.entries.push((key, hook));
        self
    }

    /// Register a hook under an exact state.
    pub fn on<F>(self, state: S, hook: F) -> Self
    where
        F: Fn(&S, &S, &mut E) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.push(HookKey::Exact(state), Arc::new(hook))
    }

    /// Register a wildcard hook.
    pub fn on_any<F>(self, hook: F) -> Self
    where
        F: Fn(&S, &S, &mut E) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.push(HookKey::Wildcard, Arc::new(hook))
    }

    /// Append every entry of `other` after this registry's entries.
    pub fn extend(mut self, other: HookRegistry<S, E>) -> Self {
        self.entries.extend(other.entries);
        self
    }

    /// Hooks that apply to `key_state`, in registration order.
    pub fn matching<'a>(&'a self, key_state: &'a S) -> impl Iterator<Item = &'a Hook<S, E>> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key.matches(key_state))
            .map(|(_, hook)| hook)
    }

    /// Run the hooks matching `key_state` in order, stopping at the first
    /// failure. Returns how many ran.
    pub fn dispatch(&self, key_state: &S, from: &S, to: &S, entity: &mut E) -> anyhow::Result<usize> {
        let mut ran = 0;
        for hook in self.matching(key_state) {
            hook(from, to, entity)?;
            ran += 1;
        }
        Ok(ran)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
