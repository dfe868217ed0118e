//! Append-only history storage.

use crate::core::{EntityRef, HistoryRecord, NewHistoryRecord, State};
use crate::store::error::PersistError;
use parking_lot::Mutex;
use std::sync::Arc;

/// Append-only store of history records.
pub trait HistoryStore<S: State>: Send + Sync {
    /// Append a record, assigning it the next sequence id.
    fn record(&self, record: NewHistoryRecord<S>) -> Result<HistoryRecord<S>, PersistError>;

    /// Records for one tracked field, in recorded order.
    fn for_field(&self, entity: &EntityRef, field: &str)
        -> Result<Vec<HistoryRecord<S>>, PersistError>;
}

#[derive(Debug)]
struct HistoryLog<S: State> {
    next_id: u64,
    records: Vec<HistoryRecord<S>>,
}

/// Thread-safe in-memory history store.
#[derive(Debug)]
pub struct MemoryHistoryStore<S: State> {
    log: Arc<Mutex<HistoryLog<S>>>,
}

impl<S: State> Clone for MemoryHistoryStore<S> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
        }
    }
}

impl<S: State> Default for MemoryHistoryStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> MemoryHistoryStore<S> {
    pub fn new() -> Self {
        Self::from_records(Vec::new())
    }

    /// Rebuild a store from previously exported records.
    pub fn from_records(records: Vec<HistoryRecord<S>>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Self {
            log: Arc::new(Mutex::new(HistoryLog { next_id, records })),
        }
    }

    /// Every record across all entities, in recorded order.
    pub fn records(&self) -> Vec<HistoryRecord<S>> {
        self.log.lock().records.clone()
    }

    pub fn len(&self) -> usize {
        self.log.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: State> HistoryStore<S> for MemoryHistoryStore<S> {
    fn record(&self, record: NewHistoryRecord<S>) -> Result<HistoryRecord<S>, PersistError> {
        let mut log = self.log.lock();
        let stored = HistoryRecord::from_new(log.next_id, record);
        log.next_id += 1;
        log.records.push(stored.clone());
        Ok(stored)
    }

    fn for_field(
        &self,
        entity: &EntityRef,
        field: &str,
    ) -> Result<Vec<HistoryRecord<S>>, PersistError> {
        Ok(self
            .log
            .lock()
            .records
            .iter()
            .filter(|r| r.entity == *entity && r.field == field)
            .cloned()
            .collect())
    }
}
