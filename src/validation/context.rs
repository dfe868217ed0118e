//! Context provided to validation checks.

use crate::core::{Actor, State};

/// What a check sees: the requested move, who asked, and the entity as it
/// stands before any mutation.
#[derive(Debug)]
pub struct TransitionContext<'a, S: State, E> {
    pub from: &'a S,
    pub to: &'a S,
    pub responsible: Option<&'a Actor>,
    pub entity: &'a E,
}

impl<'a, S: State, E> TransitionContext<'a, S, E> {
    pub fn new(from: &'a S, to: &'a S, entity: &'a E, responsible: Option<&'a Actor>) -> Self {
        Self {
            from,
            to,
            responsible,
            entity,
        }
    }

    /// Whether the move is from `from` to `to`.
    pub fn is(&self, from: &S, to: &S) -> bool {
        self.from == from && self.to == to
    }
}

impl<S: State, E> Clone for TransitionContext<'_, S, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: State, E> Copy for TransitionContext<'_, S, E> {}
