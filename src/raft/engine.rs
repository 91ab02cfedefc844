//! The fixed interfaces between this node and its consensus engine.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::KvResult;
use crate::state::ApplyResult;

/// Role of this node in the cluster, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Authorized to accept writes and membership changes.
    Leader,
    /// Replicating the leader's log.
    Follower,
    /// Campaigning for leadership.
    Candidate,
}

impl Role {
    /// Human-readable role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leader => "leader",
            Self::Follower => "follower",
            Self::Candidate => "candidate",
        }
    }
}

/// A voting member of the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Unique server identifier.
    pub id: String,
    /// Network endpoint the member's engine listens on.
    pub address: String,
}

/// The engine's current membership configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// Voting members, in engine order.
    pub servers: Vec<Member>,
}

impl Configuration {
    /// Whether a server with this id is part of the configuration.
    pub fn contains(&self, id: &str) -> bool {
        self.servers.iter().any(|m| m.id == id)
    }
}

/// Client-facing surface of the consensus engine.
///
/// Membership replicates through the engine's own configuration log, never
/// through store commands.
#[async_trait]
pub trait ConsensusEngine: Send + Sync {
    /// Submit an encoded command for cluster-wide ordering and durability.
    ///
    /// Resolves with the [`ApplyResult`] computed by the local state machine
    /// once the entry commits, or with an error if the engine rejects the
    /// proposal or `timeout` elapses first. Must be cancellable at the
    /// timeout; a slow quorum converts into a submission error, never a hung
    /// request.
    async fn propose(&self, entry: Vec<u8>, timeout: Duration) -> KvResult<ApplyResult>;

    /// This node's current role.
    fn role(&self) -> Role;

    /// Read the current membership configuration.
    fn configuration(&self) -> KvResult<Configuration>;

    /// Add a voting member. `prev_index` of zero skips the optimistic
    /// concurrency check, matching the engine's convention.
    async fn add_voter(
        &self,
        id: &str,
        address: &str,
        prev_index: u64,
        timeout: Duration,
    ) -> KvResult<()>;

    /// Remove a server from the configuration.
    async fn remove_server(&self, id: &str, prev_index: u64, timeout: Duration) -> KvResult<()>;

    /// Diagnostic counters, always readable regardless of role.
    fn stats(&self) -> HashMap<String, String>;
}

/// Callback surface the consensus engine drives.
///
/// The engine invokes `apply` strictly sequentially in commit order, and
/// never concurrently with `snapshot` or `restore`.
pub trait StateMachine: Send + Sync {
    /// Apply a committed log entry and produce its result.
    ///
    /// Must never panic on malformed input: an undecodable entry is a logged
    /// no-op with an error result.
    fn apply(&self, entry: &[u8]) -> ApplyResult;

    /// Produce a snapshot handle for log compaction.
    fn snapshot(&self) -> KvResult<Box<dyn SnapshotHandle>>;

    /// Rebuild state from a stream of serialized commands, returning the
    /// number of records applied. The source is owned by the call and
    /// released on every exit path.
    fn restore(&self, source: Box<dyn Read + Send>) -> KvResult<u64>;
}

/// A point-in-time snapshot produced by [`StateMachine::snapshot`].
pub trait SnapshotHandle: Send {
    /// Write the snapshot contents to the engine's sink.
    fn persist(&mut self, sink: &mut dyn Write) -> KvResult<()>;

    /// Release resources held by the snapshot.
    fn release(&mut self);
}
