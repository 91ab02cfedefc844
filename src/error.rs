//! Error types for store operations.

use thiserror::Error;

/// Result type for store operations.
pub type KvResult<T> = std::result::Result<T, KvError>;

/// Errors that can occur while serving reads, writes, or membership changes.
#[derive(Debug, Error)]
pub enum KvError {
    /// Key was empty after trimming.
    #[error("key is required")]
    EmptyKey,

    /// This node is not the cluster leader.
    #[error("not the leader")]
    NotLeader,

    /// Key does not exist in storage.
    #[error("key not found")]
    KeyNotFound {
        /// The key that was looked up.
        key: String,
    },

    /// Command payload could not be encoded or decoded.
    #[error("command codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The consensus engine rejected or failed the proposal.
    #[error("error persisting data in raft cluster: {cause}")]
    Propose {
        /// Engine-reported reason.
        cause: String,
    },

    /// The proposal did not commit within the submission timeout.
    #[error("proposal timed out after {timeout_ms}ms")]
    ProposeTimeout {
        /// The bounded submission timeout that elapsed.
        timeout_ms: u64,
    },

    /// A committed entry was applied but the state machine reported failure.
    #[error("apply failed: {cause}")]
    Apply {
        /// Error recorded in the apply result.
        cause: String,
    },

    /// Storage engine failure.
    #[error("storage error: {cause}")]
    Storage {
        /// Reason reported by the storage engine.
        cause: String,
    },

    /// Reading the engine's membership configuration failed.
    #[error("configuration error: {cause}")]
    Configuration {
        /// Reason reported by the engine.
        cause: String,
    },

    /// Membership change rejected by the engine.
    #[error("membership error: {cause}")]
    Membership {
        /// Reason reported by the engine, surfaced verbatim.
        cause: String,
    },

    /// Snapshot stream ended before the terminating sentinel frame.
    #[error("snapshot restore failed: {cause}")]
    SnapshotRestore {
        /// What went wrong with the stream.
        cause: String,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl KvError {
    /// Storage error from any displayable cause.
    pub fn storage(cause: impl std::fmt::Display) -> Self {
        KvError::Storage {
            cause: cause.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_leader_message() {
        assert_eq!(KvError::NotLeader.to_string(), "not the leader");
    }

    #[test]
    fn key_not_found_message() {
        let err = KvError::KeyNotFound {
            key: "a".to_string(),
        };
        assert_eq!(err.to_string(), "key not found");
    }
}
