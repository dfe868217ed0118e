//! Transitions scheduled for a future time.

use super::actor::{Actor, Attributes, EntityRef};
use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pending transition before a store has accepted it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct NewPendingTransition<S: State> {
    pub entity: EntityRef,
    pub field: String,
    pub from: S,
    pub to: S,
    pub transition_at: DateTime<Utc>,
    pub custom_properties: Attributes,
    pub responsible: Option<Actor>,
}

/// Recorded intent to move a field to `to` at `transition_at`.
///
/// Mutable only through `applied_at`, which the scheduler sets when it
/// commits the transition. Any immediate commit on the same field deletes
/// every pending record for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct PendingTransition<S: State> {
    pub id: Uuid,
    pub entity: EntityRef,
    pub field: String,
    pub from: S,
    pub to: S,
    pub transition_at: DateTime<Utc>,
    pub custom_properties: Attributes,
    pub responsible: Option<Actor>,
    pub applied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl<S: State> PendingTransition<S> {
    pub fn from_new(record: NewPendingTransition<S>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity: record.entity,
            field: record.field,
            from: record.from,
            to: record.to,
            transition_at: record.transition_at,
            custom_properties: record.custom_properties,
            responsible: record.responsible,
            applied_at: None,
            created_at,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }

    /// Not yet applied and scheduled at or before `at`.
    pub fn is_due(&self, at: DateTime<Utc>) -> bool {
        !self.is_applied() && self.transition_at <= at
    }
}
