//! Checkpoint error types.

use thiserror::Error;

/// Why a store checkpoint could not be written, read or restored.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Could not encode {encoding} checkpoint: {reason}")]
    Encode {
        encoding: &'static str,
        reason: String,
    },

    #[error("Could not decode {encoding} checkpoint: {reason}")]
    Decode {
        encoding: &'static str,
        reason: String,
    },

    #[error("Checkpoint format {found} is not readable, expected {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Two records share an id, so the stores cannot be rebuilt.
    #[error("Checkpoint holds {kind} {id} more than once")]
    DuplicateRecord { kind: &'static str, id: String },
}

impl CheckpointError {
    pub(crate) fn encode(encoding: &'static str, err: impl ToString) -> Self {
        Self::Encode {
            encoding,
            reason: err.to_string(),
        }
    }

    pub(crate) fn decode(encoding: &'static str, err: impl ToString) -> Self {
        Self::Decode {
            encoding,
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_record_names_kind_and_id() {
        let err = CheckpointError::DuplicateRecord {
            kind: "history record",
            id: "4".into(),
        };
        assert_eq!(err.to_string(), "Checkpoint holds history record 4 more than once");
    }
}
