//! Single-node consensus engine for development and tests.
//!
//! This is not a consensus implementation: there is no election, no
//! replication, and no quorum. Entries commit immediately and are applied
//! in submission order, which is exactly the contract a real engine
//! provides to the state machine. Production deployments swap in an engine
//! implementing [`ConsensusEngine`] over a cluster.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{KvError, KvResult};
use crate::state::ApplyResult;

use super::engine::{Configuration, ConsensusEngine, Member, Role, StateMachine};

/// Immediate-commit engine wrapping a local state machine.
pub struct StandaloneEngine {
    machine: Arc<dyn StateMachine>,
    role: RwLock<Role>,
    members: RwLock<Vec<Member>>,
    applied_index: AtomicU64,
    term: AtomicU64,
    // Serializes apply calls: the state machine contract is strictly
    // sequential application in commit order.
    apply_gate: tokio::sync::Mutex<()>,
}

impl StandaloneEngine {
    /// Create an engine with `local` as the sole voting member.
    pub fn new(machine: Arc<dyn StateMachine>, local: Member) -> Self {
        Self {
            machine,
            role: RwLock::new(Role::Leader),
            members: RwLock::new(vec![local]),
            applied_index: AtomicU64::new(0),
            term: AtomicU64::new(1),
            apply_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Override the reported role.
    ///
    /// A single node is always leader; tests use this to exercise the
    /// follower and candidate paths.
    pub fn set_role(&self, role: Role) {
        *self.role.write() = role;
    }

    /// Index of the last applied entry.
    pub fn applied_index(&self) -> u64 {
        self.applied_index.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConsensusEngine for StandaloneEngine {
    async fn propose(&self, entry: Vec<u8>, timeout: Duration) -> KvResult<ApplyResult> {
        if *self.role.read() != Role::Leader {
            return Err(KvError::NotLeader);
        }

        // The timeout bounds queueing behind earlier proposals; once the
        // gate is held, a single apply is a local point operation and runs
        // to completion so sequencing stays strict.
        let gate = tokio::time::timeout(timeout, self.apply_gate.lock())
            .await
            .map_err(|_| KvError::ProposeTimeout {
                timeout_ms: timeout.as_millis() as u64,
            })?;

        let machine = Arc::clone(&self.machine);
        let result = tokio::task::spawn_blocking(move || machine.apply(&entry))
            .await
            .map_err(|e| KvError::Propose {
                cause: e.to_string(),
            })?;

        let index = self.applied_index.fetch_add(1, Ordering::SeqCst) + 1;
        drop(gate);

        tracing::debug!(index, "entry applied");
        Ok(result)
    }

    fn role(&self) -> Role {
        *self.role.read()
    }

    fn configuration(&self) -> KvResult<Configuration> {
        Ok(Configuration {
            servers: self.members.read().clone(),
        })
    }

    async fn add_voter(
        &self,
        id: &str,
        address: &str,
        _prev_index: u64,
        _timeout: Duration,
    ) -> KvResult<()> {
        if *self.role.read() != Role::Leader {
            return Err(KvError::NotLeader);
        }

        let mut members = self.members.write();
        if members.iter().any(|m| m.id == id) {
            return Err(KvError::Membership {
                cause: format!("server id {id} already in configuration"),
            });
        }

        members.push(Member {
            id: id.to_string(),
            address: address.to_string(),
        });

        tracing::info!(node_id = id, address, "voter added");
        Ok(())
    }

    async fn remove_server(&self, id: &str, _prev_index: u64, _timeout: Duration) -> KvResult<()> {
        if *self.role.read() != Role::Leader {
            return Err(KvError::NotLeader);
        }

        // Removing an absent server is idempotent.
        self.members.write().retain(|m| m.id != id);

        tracing::info!(node_id = id, "server removed");
        Ok(())
    }

    fn stats(&self) -> HashMap<String, String> {
        let members = self.members.read();
        let configuration = members
            .iter()
            .map(|m| format!("{}@{}", m.id, m.address))
            .collect::<Vec<_>>()
            .join(",");

        HashMap::from([
            ("state".to_string(), self.role.read().as_str().to_string()),
            (
                "term".to_string(),
                self.term.load(Ordering::SeqCst).to_string(),
            ),
            (
                "applied_index".to_string(),
                self.applied_index.load(Ordering::SeqCst).to_string(),
            ),
            (
                "num_peers".to_string(),
                members.len().saturating_sub(1).to_string(),
            ),
            ("latest_configuration".to_string(), configuration),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raft::SnapshotHandle;
    use crate::state::NoopSnapshot;

    struct EchoMachine;

    impl StateMachine for EchoMachine {
        fn apply(&self, entry: &[u8]) -> ApplyResult {
            ApplyResult::with_data(entry.to_vec())
        }

        fn snapshot(&self) -> KvResult<Box<dyn SnapshotHandle>> {
            Ok(Box::new(NoopSnapshot))
        }

        fn restore(&self, _source: Box<dyn std::io::Read + Send>) -> KvResult<u64> {
            Ok(0)
        }
    }

    fn engine() -> StandaloneEngine {
        StandaloneEngine::new(
            Arc::new(EchoMachine),
            Member {
                id: "1".to_string(),
                address: "localhost:1111".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn propose_applies_and_advances_index() {
        let engine = engine();

        let result = engine
            .propose(b"hello".to_vec(), Duration::from_millis(500))
            .await
            .unwrap();

        assert_eq!(result.data.as_deref(), Some(b"hello".as_ref()));
        assert_eq!(engine.applied_index(), 1);
    }

    #[tokio::test]
    async fn propose_refused_off_leader() {
        let engine = engine();
        engine.set_role(Role::Follower);

        let err = engine
            .propose(b"hello".to_vec(), Duration::from_millis(500))
            .await
            .unwrap_err();

        assert!(matches!(err, KvError::NotLeader));
        assert_eq!(engine.applied_index(), 0);
    }

    #[tokio::test]
    async fn duplicate_voter_rejected() {
        let engine = engine();
        let timeout = Duration::from_millis(500);

        engine.add_voter("2", "localhost:2222", 0, timeout).await.unwrap();
        let err = engine
            .add_voter("2", "localhost:3333", 0, timeout)
            .await
            .unwrap_err();

        assert!(matches!(err, KvError::Membership { .. }));
        assert_eq!(engine.configuration().unwrap().servers.len(), 2);
    }

    #[tokio::test]
    async fn remove_server_is_idempotent() {
        let engine = engine();
        let timeout = Duration::from_millis(500);

        engine.add_voter("2", "localhost:2222", 0, timeout).await.unwrap();
        engine.remove_server("2", 0, timeout).await.unwrap();
        engine.remove_server("2", 0, timeout).await.unwrap();

        assert!(!engine.configuration().unwrap().contains("2"));
    }

    #[tokio::test]
    async fn stats_reports_role_and_index() {
        let engine = engine();
        let stats = engine.stats();

        assert_eq!(stats.get("state").map(String::as_str), Some("leader"));
        assert_eq!(stats.get("applied_index").map(String::as_str), Some("0"));
    }
}
