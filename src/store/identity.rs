//! Identity providers supply the default responsible actor.

use crate::core::Actor;

/// Source of the ambient actor, consulted only when a caller does not name
/// one explicitly.
pub trait IdentityProvider: Send + Sync {
    fn current_actor(&self) -> Option<Actor>;
}

/// Provider for contexts with no authenticated actor.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIdentity;

impl IdentityProvider for NoIdentity {
    fn current_actor(&self) -> Option<Actor> {
        None
    }
}

/// Provider that always answers with the same actor.
#[derive(Debug, Clone)]
pub struct FixedIdentity(pub Actor);

impl IdentityProvider for FixedIdentity {
    fn current_actor(&self) -> Option<Actor> {
        Some(self.0.clone())
    }
}

impl<F> IdentityProvider for F
where
    F: Fn() -> Option<Actor> + Send + Sync,
{
    fn current_actor(&self) -> Option<Actor> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_identity_returns_actor() {
        let provider = FixedIdentity(Actor::new("user", "7"));
        assert_eq!(provider.current_actor(), Some(Actor::new("user", "7")));
    }

    #[test]
    fn closures_are_providers() {
        let provider = || Some(Actor::new("service", "scheduler"));
        assert_eq!(provider.current_actor().unwrap().kind, "service");
        assert!(NoIdentity.current_actor().is_none());
    }
}
