//! Cluster membership management.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{KvError, KvResult};
use crate::raft::{ConsensusEngine, Role};

/// Manages voting membership through the consensus engine's configuration
/// API.
///
/// Joins and removals are leader-only and are gated on the engine's current
/// configuration being readable; engine-level failures (such as a duplicate
/// server id) surface verbatim. `stats` is read-only and available on any
/// role.
pub struct MembershipManager {
    engine: Arc<dyn ConsensusEngine>,
    // Zero leaves the bound to the engine's own default.
    change_timeout: Duration,
}

impl MembershipManager {
    /// Create a manager over the injected engine handle.
    pub fn new(engine: Arc<dyn ConsensusEngine>) -> Self {
        Self {
            engine,
            change_timeout: Duration::ZERO,
        }
    }

    /// Add a voting member at `address`.
    ///
    /// Returns the engine's diagnostic counters on success, mirroring what
    /// the join endpoint reports back to the operator.
    pub async fn join(
        &self,
        node_id: &str,
        address: &str,
    ) -> KvResult<HashMap<String, String>> {
        self.check_leadership()?;
        self.check_configuration()?;

        self.engine
            .add_voter(node_id, address, 0, self.change_timeout)
            .await?;

        tracing::info!(node_id, address, "node joined the cluster");
        Ok(self.engine.stats())
    }

    /// Remove a server from the configuration.
    pub async fn remove(&self, node_id: &str) -> KvResult<HashMap<String, String>> {
        self.check_leadership()?;
        self.check_configuration()?;

        self.engine
            .remove_server(node_id, 0, self.change_timeout)
            .await?;

        tracing::info!(node_id, "node removed from the cluster");
        Ok(self.engine.stats())
    }

    /// The engine's diagnostic counters.
    pub fn stats(&self) -> HashMap<String, String> {
        self.engine.stats()
    }

    fn check_leadership(&self) -> KvResult<()> {
        if self.engine.role() != Role::Leader {
            return Err(KvError::NotLeader);
        }
        Ok(())
    }

    fn check_configuration(&self) -> KvResult<()> {
        self.engine.configuration()?;
        Ok(())
    }
}
