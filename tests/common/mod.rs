//! Common test utilities.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use raftkv::api::{ApiServer, AppState, ServerConfig, ShutdownHandle};
use raftkv::raft::{ConsensusEngine, StandaloneEngine};
use raftkv::state::StoreStateMachine;
use raftkv::store::{SledStore, StorageEngine};
use raftkv::NodeConfig;

/// Atomic counter for allocating unique ports.
static PORT_COUNTER: AtomicU16 = AtomicU16::new(18000);

/// Get a unique port for testing.
pub fn get_test_port() -> u16 {
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A fully wired node over a throwaway store, without the HTTP listener.
pub struct TestNode {
    pub store: Arc<dyn StorageEngine>,
    pub engine: Arc<StandaloneEngine>,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestNode {
    pub fn new() -> Self {
        let config = NodeConfig::default();
        let store: Arc<dyn StorageEngine> =
            Arc::new(SledStore::temporary().expect("open temporary store"));
        let machine = Arc::new(StoreStateMachine::new(Arc::clone(&store)));
        let engine = Arc::new(StandaloneEngine::new(machine, config.local_member()));

        let state = Arc::new(AppState::new(
            config.node_id.clone(),
            Arc::clone(&engine) as Arc<dyn ConsensusEngine>,
            Arc::clone(&store),
            config.propose_timeout(),
        ));

        Self {
            store,
            engine,
            state,
        }
    }

    /// Spawn an API server over this node and wait for it to accept
    /// connections. Returns the `/api/v1` base URL and the shutdown handle.
    pub async fn serve(&self) -> (String, ShutdownHandle) {
        let port = get_test_port();
        let config = ServerConfig::new("127.0.0.1", port);
        let server = ApiServer::new(config, Arc::clone(&self.state));
        let shutdown = server.shutdown_handle();

        tokio::spawn(async move { server.run().await.expect("server failed") });

        wait_for_listener(port).await;
        (format!("http://127.0.0.1:{port}/api/v1"), shutdown)
    }
}

async fn wait_for_listener(port: u16) {
    for _ in 0..50 {
        if tokio::net::TcpStream::connect(("127.0.0.1", port))
            .await
            .is_ok()
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server on port {port} never came up");
}
