//! Transition tables: which target states are legal from each source state.

use super::state::State;
use serde::{Deserialize, Serialize};

/// Mapping from a source state to the ordered set of legal targets.
///
/// Entries keep insertion order, and targets keep the order they were
/// allowed in, so `targets` is stable across calls.
///
/// # Example
///
/// ```rust
/// use statekeeper::core::TransitionTable;
///
/// let table = TransitionTable::new()
///     .allow("draft".to_string(), ["submitted".to_string()])
///     .allow(
///         "submitted".to_string(),
///         ["approved".to_string(), "rejected".to_string()],
///     );
///
/// assert!(table.contains(&"draft".to_string(), &"submitted".to_string()));
/// assert!(!table.contains(&"draft".to_string(), &"approved".to_string()));
/// assert!(table.targets(&"approved".to_string()).is_empty());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TransitionTable<S: State> {
    entries: Vec<(S, Vec<S>)>,
}

impl<S: State> Default for TransitionTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> TransitionTable<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Allow moving from `from` to each of `targets`.
    ///
    /// Repeated calls for the same source merge their targets; duplicates
    /// are ignored.
    pub fn allow<I>(mut self, from: S, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        let index = match self.entries.iter().position(|(source, _)| *source == from) {
            Some(index) => index,
            None => {
                self.entries.push((from, Vec::new()));
                self.entries.len() - 1
            }
        };
        let existing = &mut self.entries[index].1;
        for target in targets {
            if !existing.contains(&target) {
                existing.push(target);
            }
        }
        self
    }

    /// Legal targets from `from`. Unknown sources have none.
    pub fn targets(&self, from: &S) -> &[S] {
        self.entries
            .iter()
            .find(|(source, _)| source == from)
            .map(|(_, targets)| targets.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `to` is a legal target from `from`.
    pub fn contains(&self, from: &S, to: &S) -> bool {
        self.targets(from).contains(to)
    }

    /// Source states that have at least one entry, in insertion order.
    pub fn sources(&self) -> impl Iterator<Item = &S> {
        self.entries.iter().map(|(source, _)| source)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(name: &str) -> String {
        name.to_string()
    }

    fn review_table() -> TransitionTable<String> {
        TransitionTable::new()
            .allow(s("draft"), [s("submitted")])
            .allow(s("submitted"), [s("approved"), s("rejected")])
    }

    #[test]
    fn contains_listed_targets() {
        let table = review_table();
        assert!(table.contains(&s("draft"), &s("submitted")));
        assert!(table.contains(&s("submitted"), &s("rejected")));
    }

    #[test]
    fn missing_source_has_no_targets() {
        let table = review_table();
        assert!(table.targets(&s("approved")).is_empty());
        assert!(!table.contains(&s("approved"), &s("draft")));
    }

    #[test]
    fn allow_merges_and_dedupes_targets() {
        let table = review_table().allow(s("submitted"), [s("approved"), s("draft")]);
        assert_eq!(
            table.targets(&s("submitted")),
            &[s("approved"), s("rejected"), s("draft")]
        );
        assert_eq!(table.sources().count(), 2);
    }

    #[test]
    fn empty_table_reports_empty() {
        let table: TransitionTable<String> = TransitionTable::default();
        assert!(table.is_empty());
        assert!(!review_table().is_empty());
    }
}
