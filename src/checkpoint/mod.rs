//! Checkpoint and restore for the in-memory stores.
//!
//! A [`StoreCheckpoint`] captures every history record and pending
//! transition held by a [`MemoryHistoryStore`] and [`MemoryPendingStore`],
//! so a process can persist them and rebuild equivalent stores on restart.
//! Entity rows are not part of a checkpoint; they belong to the caller.

use crate::core::{HistoryRecord, PendingTransition, State};
use crate::store::{MemoryHistoryStore, MemoryPendingStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of history and pending stores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StoreCheckpoint<S: State> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: Uuid,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// History records in recorded order
    pub history: Vec<HistoryRecord<S>>,

    /// Pending transitions, applied ones included
    pub pending: Vec<PendingTransition<S>>,
}

/// Binary framing. Attribute bags hold arbitrary JSON values, which bincode
/// cannot decode, so the record body travels as JSON text.
#[derive(Serialize, Deserialize)]
struct BinaryFrame {
    version: u32,
    id: Uuid,
    timestamp: DateTime<Utc>,
    body: String,
}

#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
struct RecordBody<S: State> {
    history: Vec<HistoryRecord<S>>,
    pending: Vec<PendingTransition<S>>,
}

impl<S: State> StoreCheckpoint<S> {
    /// Snapshot the current contents of both stores.
    pub fn capture(history: &MemoryHistoryStore<S>, pending: &MemoryPendingStore<S>) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            history: history.records(),
            pending: pending.records(),
        }
    }

    /// Rebuild stores holding this checkpoint's records.
    ///
    /// History ids continue after the highest restored id.
    pub fn restore(self) -> Result<(MemoryHistoryStore<S>, MemoryPendingStore<S>), CheckpointError> {
        self.validate()?;
        Ok((
            MemoryHistoryStore::from_records(self.history),
            MemoryPendingStore::from_records(self.pending),
        ))
    }

    /// Check version and record identity invariants.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        let mut history_ids = HashSet::new();
        if let Some(record) = self.history.iter().find(|r| !history_ids.insert(r.id)) {
            return Err(CheckpointError::DuplicateRecord {
                kind: "history record",
                id: record.id.to_string(),
            });
        }

        let mut pending_ids = HashSet::new();
        if let Some(record) = self.pending.iter().find(|p| !pending_ids.insert(p.id)) {
            return Err(CheckpointError::DuplicateRecord {
                kind: "pending transition",
                id: record.id.to_string(),
            });
        }

        Ok(())
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self).map_err(|e| CheckpointError::encode("json", e))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self =
            serde_json::from_str(json).map_err(|e| CheckpointError::decode("json", e))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    /// Compact binary form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        let body = RecordBody {
            history: self.history.clone(),
            pending: self.pending.clone(),
        };
        let frame = BinaryFrame {
            version: self.version,
            id: self.id,
            timestamp: self.timestamp,
            body: serde_json::to_string(&body).map_err(|e| CheckpointError::encode("binary", e))?,
        };
        bincode::serialize(&frame).map_err(|e| CheckpointError::encode("binary", e))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let frame: BinaryFrame =
            bincode::deserialize(bytes).map_err(|e| CheckpointError::decode("binary", e))?;
        if frame.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: frame.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        let body: RecordBody<S> =
            serde_json::from_str(&frame.body).map_err(|e| CheckpointError::decode("binary", e))?;

        let checkpoint = Self {
            version: frame.version,
            id: frame.id,
            timestamp: frame.timestamp,
            history: body.history,
            pending: body.pending,
        };
        checkpoint.validate()?;
        Ok(checkpoint)
    }
}
