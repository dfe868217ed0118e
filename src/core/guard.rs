//! Role-aware transition table resolution.
//!
//! A guard turns the responsible actor into the transition table that
//! applies to them. Resolution must be pure: the same actor always yields
//! the same table.

use super::actor::Actor;
use super::state::State;
use super::table::TransitionTable;

type Resolver<S> = Box<dyn Fn(Option<&Actor>) -> TransitionTable<S> + Send + Sync>;

/// Resolves the legal-transition graph for a responsible actor.
///
/// # Example
///
/// ```rust
/// use statekeeper::core::{Actor, Guard, TransitionTable};
///
/// let guard = Guard::new(|actor: Option<&Actor>| {
///     let table = TransitionTable::new().allow("draft".to_string(), ["submitted".to_string()]);
///     match actor {
///         Some(a) if a.kind == "reviewer" => {
///             table.allow("submitted".to_string(), ["approved".to_string()])
///         }
///         _ => table,
///     }
/// });
///
/// let reviewer = Actor::new("reviewer", "r-1");
/// let approved = "approved".to_string();
/// let submitted = "submitted".to_string();
/// assert!(guard.resolve(Some(&reviewer)).contains(&submitted, &approved));
/// assert!(!guard.resolve(None).contains(&submitted, &approved));
/// ```
pub struct Guard<S: State> {
    resolver: Resolver<S>,
}

impl<S: State> Guard<S> {
    /// Create a guard from a pure resolver function.
    pub fn new<F>(resolver: F) -> Self
    where
        F: Fn(Option<&Actor>) -> TransitionTable<S> + Send + Sync + 'static,
    {
        Guard {
            resolver: Box::new(resolver),
        }
    }

    /// A guard that ignores the actor and always yields `table`.
    pub fn fixed(table: TransitionTable<S>) -> Self {
        Self::new(move |_| table.clone())
    }

    /// The table that applies to `responsible`.
    pub fn resolve(&self, responsible: Option<&Actor>) -> TransitionTable<S> {
        (self.resolver)(responsible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(name: &str) -> String {
        name.to_string()
    }

    fn role_guard() -> Guard<String> {
        Guard::new(|actor: Option<&Actor>| {
            let table = TransitionTable::new().allow(s("draft"), [s("submitted")]);
            match actor {
                Some(a) if a.kind == "admin" => {
                    table.allow(s("submitted"), [s("approved"), s("rejected")])
                }
                _ => table,
            }
        })
    }

    #[test]
    fn fixed_guard_ignores_actor() {
        let guard = Guard::fixed(TransitionTable::new().allow(s("a"), [s("b")]));
        assert!(guard.resolve(None).contains(&s("a"), &s("b")));
        assert!(guard
            .resolve(Some(&Actor::new("user", "1")))
            .contains(&s("a"), &s("b")));
    }

    #[test]
    fn role_specific_tables_differ() {
        let guard = role_guard();
        let admin = Actor::new("admin", "1");
        assert!(guard
            .resolve(Some(&admin))
            .contains(&s("submitted"), &s("approved")));
        assert!(!guard.resolve(None).contains(&s("submitted"), &s("approved")));
    }

    #[test]
    fn guard_is_deterministic() {
        let guard = role_guard();
        let first = guard.resolve(None);
        let second = guard.resolve(None);
        assert_eq!(first, second);
    }
}
