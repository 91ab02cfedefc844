//! Node configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::raft::Member;

/// Configuration for a store node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// This node's unique id in the cluster.
    pub node_id: String,

    /// Host the HTTP API binds to.
    pub host: String,

    /// Port the HTTP API listens on.
    pub port: u16,

    /// Port the consensus engine's transport uses.
    pub raft_port: u16,

    /// Directory for the storage engine's files.
    pub storage_path: PathBuf,

    /// Bound on a single consensus submission, in milliseconds.
    pub propose_timeout_ms: u64,

    /// How long shutdown waits for in-flight requests to drain, in
    /// milliseconds.
    pub shutdown_grace_ms: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: "1".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            raft_port: 1111,
            storage_path: PathBuf::from("tmp/storage"),
            propose_timeout_ms: 500,
            shutdown_grace_ms: 5_000,
        }
    }
}

impl NodeConfig {
    /// Create a new configuration builder.
    pub fn builder() -> NodeConfigBuilder {
        NodeConfigBuilder::default()
    }

    /// Address the consensus engine advertises.
    pub fn raft_addr(&self) -> String {
        format!("localhost:{}", self.raft_port)
    }

    /// This node as a cluster member.
    pub fn local_member(&self) -> Member {
        Member {
            id: self.node_id.clone(),
            address: self.raft_addr(),
        }
    }

    /// Consensus submission timeout as a duration.
    pub fn propose_timeout(&self) -> Duration {
        Duration::from_millis(self.propose_timeout_ms)
    }

    /// Shutdown drain grace period as a duration.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.node_id.trim().is_empty() {
            return Err("node_id is required".to_string());
        }

        if self.port == self.raft_port {
            return Err(format!(
                "port and raft_port must differ (both {})",
                self.port
            ));
        }

        if self.propose_timeout_ms == 0 {
            return Err("propose_timeout_ms must be > 0".to_string());
        }

        Ok(())
    }
}

/// Builder for [`NodeConfig`].
#[derive(Debug, Default)]
pub struct NodeConfigBuilder {
    config: NodeConfig,
}

impl NodeConfigBuilder {
    /// Set the node id.
    pub fn node_id(mut self, id: impl Into<String>) -> Self {
        self.config.node_id = id.into();
        self
    }

    /// Set the HTTP bind host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the HTTP port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the consensus transport port.
    pub fn raft_port(mut self, port: u16) -> Self {
        self.config.raft_port = port;
        self
    }

    /// Set the storage directory.
    pub fn storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.storage_path = path.into();
        self
    }

    /// Set the consensus submission timeout in milliseconds.
    pub fn propose_timeout_ms(mut self, ms: u64) -> Self {
        self.config.propose_timeout_ms = ms;
        self
    }

    /// Set the shutdown drain grace period in milliseconds.
    pub fn shutdown_grace_ms(mut self, ms: u64) -> Self {
        self.config.shutdown_grace_ms = ms;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<NodeConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}
