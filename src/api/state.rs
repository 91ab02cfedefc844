//! Shared application state for API handlers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::raft::ConsensusEngine;
use crate::service::{LocalReader, MembershipManager, WriteCoordinator};
use crate::store::StorageEngine;

/// Shared application state passed to all handlers.
///
/// Both collaborators are injected here and threaded into each service's
/// constructor; nothing reaches for a global handle.
pub struct AppState {
    /// This node's id.
    pub node_id: String,
    /// Write-path coordinator.
    pub writer: WriteCoordinator,
    /// Local read path.
    pub reader: LocalReader,
    /// Membership manager.
    pub membership: MembershipManager,
    /// Engine handle for role reporting.
    pub engine: Arc<dyn ConsensusEngine>,
    /// Server start time.
    pub start_time: Instant,
}

impl AppState {
    /// Wire up the services over the injected collaborator handles.
    pub fn new(
        node_id: impl Into<String>,
        engine: Arc<dyn ConsensusEngine>,
        store: Arc<dyn StorageEngine>,
        propose_timeout: Duration,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            writer: WriteCoordinator::new(Arc::clone(&engine), propose_timeout),
            reader: LocalReader::new(store),
            membership: MembershipManager::new(Arc::clone(&engine)),
            engine,
            start_time: Instant::now(),
        }
    }

    /// Server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
