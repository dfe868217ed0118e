//! Pending transition storage.

use crate::core::{EntityRef, NewPendingTransition, PendingTransition, State};
use crate::store::error::PersistError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Store of scheduled transitions.
///
/// `create`, `delete_all_for` and `mark_applied` must be atomic with respect
/// to each other: a record created concurrently with a bulk delete is either
/// removed by it or survives it whole.
pub trait PendingStore<S: State>: Send + Sync {
    fn create(&self, record: NewPendingTransition<S>) -> Result<PendingTransition<S>, PersistError>;

    /// Records for one tracked field, applied or not, oldest first.
    fn all_for(&self, entity: &EntityRef, field: &str)
        -> Result<Vec<PendingTransition<S>>, PersistError>;

    /// Remove every record for the field. Returns how many were removed.
    fn delete_all_for(&self, entity: &EntityRef, field: &str) -> Result<usize, PersistError>;

    fn mark_applied(&self, id: Uuid, at: DateTime<Utc>)
        -> Result<PendingTransition<S>, PersistError>;

    /// Unapplied records scheduled at or before `at`, earliest first.
    fn due(&self, at: DateTime<Utc>) -> Result<Vec<PendingTransition<S>>, PersistError>;
}

/// Thread-safe in-memory pending transition store.
#[derive(Debug)]
pub struct MemoryPendingStore<S: State> {
    records: Arc<Mutex<Vec<PendingTransition<S>>>>,
}

impl<S: State> Clone for MemoryPendingStore<S> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<S: State> Default for MemoryPendingStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> MemoryPendingStore<S> {
    pub fn new() -> Self {
        Self::from_records(Vec::new())
    }

    /// Rebuild a store from previously exported records.
    pub fn from_records(records: Vec<PendingTransition<S>>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub fn records(&self) -> Vec<PendingTransition<S>> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: State> PendingStore<S> for MemoryPendingStore<S> {
    fn create(&self, record: NewPendingTransition<S>) -> Result<PendingTransition<S>, PersistError> {
        let stored = PendingTransition::from_new(record, Utc::now());
        self.records.lock().push(stored.clone());
        Ok(stored)
    }

    fn all_for(
        &self,
        entity: &EntityRef,
        field: &str,
    ) -> Result<Vec<PendingTransition<S>>, PersistError> {
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|r| r.entity == *entity && r.field == field)
            .cloned()
            .collect())
    }

    fn delete_all_for(&self, entity: &EntityRef, field: &str) -> Result<usize, PersistError> {
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|r| !(r.entity == *entity && r.field == field));
        Ok(before - records.len())
    }

    fn mark_applied(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<PendingTransition<S>, PersistError> {
        let mut records = self.records.lock();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| PersistError::NotFound(format!("pending transition {id}")))?;
        record.applied_at = Some(at);
        Ok(record.clone())
    }

    fn due(&self, at: DateTime<Utc>) -> Result<Vec<PendingTransition<S>>, PersistError> {
        let mut due: Vec<_> = self
            .records
            .lock()
            .iter()
            .filter(|r| r.is_due(at))
            .cloned()
            .collect();
        due.sort_by_key(|r| r.transition_at);
        Ok(due)
    }
}
