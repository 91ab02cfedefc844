//! Write path: validation, leadership gating, and consensus submission.

use std::sync::Arc;
use std::time::Duration;

use crate::command::CommandPayload;
use crate::error::{KvError, KvResult};
use crate::raft::{ConsensusEngine, Role};
use crate::state::ApplyResult;

use super::validate_key;

/// Default bound on a single consensus submission.
pub const DEFAULT_PROPOSE_TIMEOUT: Duration = Duration::from_millis(500);

/// Coordinates writes through the consensus engine.
///
/// Writes are accepted only while this node is the leader; a request landing
/// on a follower fails fast with a not-leader error before any consensus
/// round-trip, and the client retries against the leader. Transparent
/// forwarding is deliberately not provided.
pub struct WriteCoordinator {
    engine: Arc<dyn ConsensusEngine>,
    propose_timeout: Duration,
}

impl WriteCoordinator {
    /// Create a coordinator over the injected engine handle.
    pub fn new(engine: Arc<dyn ConsensusEngine>, propose_timeout: Duration) -> Self {
        Self {
            engine,
            propose_timeout,
        }
    }

    /// Replicate a SET for `key`.
    ///
    /// `value` is the pre-serialized blob; `None` or an empty blob commits a
    /// no-op write (the applier's skip-empty-value policy).
    pub async fn set(&self, key: &str, value: Option<Vec<u8>>) -> KvResult<ApplyResult> {
        let key = validate_key(key)?;
        self.submit(CommandPayload::set(key, value)).await
    }

    /// Replicate a DELETE for `key`.
    pub async fn delete(&self, key: &str) -> KvResult<ApplyResult> {
        let key = validate_key(key)?;
        self.submit(CommandPayload::delete(key)).await
    }

    async fn submit(&self, payload: CommandPayload) -> KvResult<ApplyResult> {
        if self.engine.role() != Role::Leader {
            return Err(KvError::NotLeader);
        }

        let entry = payload.encode()?;
        let result = self.engine.propose(entry, self.propose_timeout).await?;

        // The entry committed cluster-wide; a failure recorded in the result
        // is the applier reporting that the mutation itself failed.
        if let Some(cause) = result.error.clone() {
            return Err(KvError::Apply { cause });
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raft::{Member, StandaloneEngine};
    use crate::state::StoreStateMachine;
    use crate::store::{SledStore, StorageEngine};

    fn harness() -> (WriteCoordinator, Arc<StandaloneEngine>, Arc<dyn StorageEngine>) {
        let store: Arc<dyn StorageEngine> = Arc::new(SledStore::temporary().unwrap());
        let machine = Arc::new(StoreStateMachine::new(Arc::clone(&store)));
        let engine = Arc::new(StandaloneEngine::new(
            machine,
            Member {
                id: "1".to_string(),
                address: "localhost:1111".to_string(),
            },
        ));
        let coordinator = WriteCoordinator::new(
            Arc::clone(&engine) as Arc<dyn ConsensusEngine>,
            DEFAULT_PROPOSE_TIMEOUT,
        );
        (coordinator, engine, store)
    }

    #[tokio::test]
    async fn set_replicates_and_persists() {
        let (coordinator, _engine, store) = harness();

        let result = coordinator
            .set("a", Some(b"\"1\"".to_vec()))
            .await
            .unwrap();

        assert_eq!(result.data.as_deref(), Some(b"\"1\"".as_ref()));
        assert_eq!(store.get("a").unwrap(), Some(b"\"1\"".to_vec()));
    }

    #[tokio::test]
    async fn follower_rejects_before_submission() {
        let (coordinator, engine, store) = harness();
        engine.set_role(Role::Follower);

        let err = coordinator.set("a", Some(b"\"1\"".to_vec())).await.unwrap_err();

        assert!(matches!(err, KvError::NotLeader));
        // The write never reached consensus, let alone storage.
        assert_eq!(engine.applied_index(), 0);
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[tokio::test]
    async fn empty_key_rejected_without_submission() {
        let (coordinator, engine, _store) = harness();

        let err = coordinator.set("   ", Some(b"\"1\"".to_vec())).await.unwrap_err();

        assert!(matches!(err, KvError::EmptyKey));
        assert_eq!(engine.applied_index(), 0);
    }

    #[tokio::test]
    async fn delete_replicates() {
        let (coordinator, _engine, store) = harness();

        coordinator.set("a", Some(b"\"1\"".to_vec())).await.unwrap();
        coordinator.delete("a").await.unwrap();

        assert_eq!(store.get("a").unwrap(), None);
    }
}
