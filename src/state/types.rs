//! Types shared between the state machine and the consensus engine.

use serde::{Deserialize, Serialize};

/// Response from applying a committed entry to the state machine.
///
/// The proposer co-located with the leader receives this from `propose`;
/// other nodes compute an equivalent result and discard it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Error message if the operation failed. A failed single-key mutation
    /// leaves storage unchanged.
    pub error: Option<String>,
    /// Value produced by the operation: the echoed blob for SET, the fetched
    /// blob for GET, nothing for DELETE.
    pub data: Option<Vec<u8>>,
}

impl ApplyResult {
    /// Successful result with no payload.
    pub fn ok() -> Self {
        Self::default()
    }

    /// Failed result.
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            error: Some(msg.into()),
            data: None,
        }
    }

    /// Successful result carrying a value blob.
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            error: None,
            data: Some(data),
        }
    }

    /// Whether the apply failed.
    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

/// What the state machine is currently doing.
///
/// The consensus engine guarantees that at most one of the active phases
/// runs at a time; the machine records the phase so a violated contract
/// shows up in the logs instead of as silent corruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No callback in flight.
    Idle,
    /// Applying a committed entry.
    Applying,
    /// Producing a snapshot handle.
    Snapshotting,
    /// Rebuilding state from a snapshot stream.
    Restoring,
}

impl Phase {
    /// Human-readable phase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Applying => "applying",
            Self::Snapshotting => "snapshotting",
            Self::Restoring => "restoring",
        }
    }
}
