//! Audit history of committed transitions.
//!
//! History records are immutable: stores append them and never edit or
//! remove them. [`StateHistory`] is a read-only view over the records of
//! one tracked field, answering "was it ever", "how often" and "when".

use super::actor::{Actor, Attributes, EntityRef};
use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A history entry before a store has assigned its sequence id.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct NewHistoryRecord<S: State> {
    pub entity: EntityRef,
    pub field: String,
    pub from: S,
    pub to: S,
    pub custom_properties: Attributes,
    pub responsible: Option<Actor>,
    /// Other attributes changed on the entity in the same save.
    pub changed_attributes: Attributes,
    pub timestamp: DateTime<Utc>,
}

/// Record of a single committed transition.
///
/// `id` is assigned by the store and grows with insertion order; it is the
/// recency key for "most recent" queries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct HistoryRecord<S: State> {
    pub id: u64,
    pub entity: EntityRef,
    pub field: String,
    pub from: S,
    pub to: S,
    pub custom_properties: Attributes,
    pub responsible: Option<Actor>,
    pub changed_attributes: Attributes,
    pub timestamp: DateTime<Utc>,
}

impl<S: State> HistoryRecord<S> {
    pub fn from_new(id: u64, record: NewHistoryRecord<S>) -> Self {
        Self {
            id,
            entity: record.entity,
            field: record.field,
            from: record.from,
            to: record.to,
            custom_properties: record.custom_properties,
            responsible: record.responsible,
            changed_attributes: record.changed_attributes,
            timestamp: record.timestamp,
        }
    }

    pub fn custom_property(&self, key: &str) -> Option<&serde_json::Value> {
        self.custom_properties.get(key)
    }

    pub fn changed_attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.changed_attributes.get(key)
    }
}

/// Ordered history of one tracked field.
///
/// # Example
///
/// ```rust
/// use statekeeper::core::{Attributes, EntityRef, HistoryRecord, StateHistory};
/// use chrono::Utc;
///
/// let record = |id: u64, from: &str, to: &str| HistoryRecord {
///     id,
///     entity: EntityRef::new("document", "1"),
///     field: "status".to_string(),
///     from: from.to_string(),
///     to: to.to_string(),
///     custom_properties: Attributes::new(),
///     responsible: None,
///     changed_attributes: Attributes::new(),
///     timestamp: Utc::now(),
/// };
///
/// let history = StateHistory::from_records(vec![
///     record(1, "draft", "submitted"),
///     record(2, "submitted", "draft"),
///     record(3, "draft", "submitted"),
/// ]);
///
/// assert!(history.was(&"submitted".to_string()));
/// assert_eq!(history.times_was(&"submitted".to_string()), 2);
/// assert_eq!(history.snapshot_when(&"submitted".to_string()).unwrap().id, 3);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    records: Vec<HistoryRecord<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Build a view from records in recorded order.
    pub fn from_records(records: Vec<HistoryRecord<S>>) -> Self {
        Self { records }
    }

    /// All records, in recorded order.
    pub fn records(&self) -> &[HistoryRecord<S>] {
        &self.records
    }

    pub fn into_records(self) -> Vec<HistoryRecord<S>> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn reaching<'a, 'b>(&'a self, state: &'b S) -> impl Iterator<Item = &'a HistoryRecord<S>> + 'b
    where
        'a: 'b,
    {
        self.records.iter().filter(move |record| record.to == *state)
    }

    /// Whether the field ever reached `state`.
    pub fn was(&self, state: &S) -> bool {
        self.reaching(state).next().is_some()
    }

    pub fn times_was(&self, state: &S) -> usize {
        self.reaching(state).count()
    }

    /// When the field most recently reached `state`.
    pub fn when_was(&self, state: &S) -> Option<DateTime<Utc>> {
        self.snapshot_when(state).map(|record| record.timestamp)
    }

    /// The most recent record reaching `state`, by sequence id.
    pub fn snapshot_when(&self, state: &S) -> Option<&HistoryRecord<S>> {
        self.reaching(state).max_by_key(|record| record.id)
    }

    /// Every record reaching `state`, in recorded order.
    pub fn snapshots_when(&self, state: &S) -> Vec<&HistoryRecord<S>> {
        self.reaching(state).collect()
    }
}
