//! Store commands - operations that go through raft consensus.
//!
//! Every write in the cluster is wrapped in a [`CommandPayload`], serialized
//! into the consensus log, and applied deterministically on all nodes in the
//! same order. The encoding is JSON: self-describing, so any node can decode
//! an entry written by any other node, including across releases that only
//! add operations.

use serde::{Deserialize, Serialize};

use crate::error::KvResult;

/// Normalized store operations understood by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Write a key/value pair.
    Set,
    /// Read a key through the replicated log.
    Get,
    /// Remove a key.
    Delete,
}

impl Operation {
    /// Parse an operation tag, normalizing case and surrounding whitespace.
    ///
    /// Returns `None` for tags this version does not understand; callers
    /// treat those as logged no-ops rather than decode failures.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_uppercase().as_str() {
            "SET" => Some(Self::Set),
            "GET" => Some(Self::Get),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Wire tag for this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Set => "SET",
            Self::Get => "GET",
            Self::Delete => "DELETE",
        }
    }
}

/// The operation envelope exchanged between the write path and the applier
/// via the consensus log.
///
/// The value is an opaque blob of pre-serialized JSON. The codec never
/// interprets it; only the storage serialization step does. `operation` is
/// kept as a string on the wire so unknown tags decode cleanly and are
/// rejected at dispatch instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPayload {
    /// Operation tag, case-normalized at dispatch.
    pub operation: String,
    /// Target key. Non-empty and trimmed by the write path.
    pub key: String,
    /// Serialized value blob, if the operation carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Vec<u8>>,
}

impl CommandPayload {
    /// Build a SET command.
    pub fn set(key: impl Into<String>, value: Option<Vec<u8>>) -> Self {
        Self {
            operation: Operation::Set.as_str().to_string(),
            key: key.into(),
            value,
        }
    }

    /// Build a GET command.
    pub fn get(key: impl Into<String>) -> Self {
        Self {
            operation: Operation::Get.as_str().to_string(),
            key: key.into(),
            value: None,
        }
    }

    /// Build a DELETE command.
    pub fn delete(key: impl Into<String>) -> Self {
        Self {
            operation: Operation::Delete.as_str().to_string(),
            key: key.into(),
            value: None,
        }
    }

    /// Normalized operation, or `None` if the tag is unknown.
    pub fn op(&self) -> Option<Operation> {
        Operation::parse(&self.operation)
    }

    /// Serialize for submission to the consensus log.
    pub fn encode(&self) -> KvResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize a committed log entry.
    ///
    /// Failure is reported as a structured error; the applier turns it into
    /// a logged no-op, never a crash.
    pub fn decode(bytes: &[u8]) -> KvResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
