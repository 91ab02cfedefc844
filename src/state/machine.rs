//! The state machine applied by the consensus engine.
//!
//! Every node applies the same committed entries in the same order, so the
//! dispatch here must be deterministic: decode, normalize the operation,
//! mutate storage transactionally, report the outcome in the result. Errors
//! are recorded in the [`ApplyResult`], never thrown back at the engine's
//! commit stream.

use std::io::Read;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::command::{CommandPayload, Operation};
use crate::error::KvResult;
use crate::raft::{SnapshotHandle, StateMachine};
use crate::store::StorageEngine;

use super::snapshot::{Frame, NoopSnapshot, RecordReader};
use super::types::{ApplyResult, Phase};

/// State machine over the durable key-value store.
///
/// The applier is the only component permitted to mutate storage outside of
/// the restore path, and restore never runs concurrently with apply; the
/// consensus engine guarantees that exclusion externally.
pub struct StoreStateMachine {
    store: Arc<dyn StorageEngine>,
    phase: Mutex<Phase>,
}

impl StoreStateMachine {
    /// Create a state machine over the injected storage handle.
    pub fn new(store: Arc<dyn StorageEngine>) -> Self {
        Self {
            store,
            phase: Mutex::new(Phase::Idle),
        }
    }

    /// Enter a phase for the duration of the returned guard.
    ///
    /// Overlap means the consensus engine broke its mutual-exclusion
    /// contract; that is logged loudly rather than papered over with a lock
    /// the contract says we do not need.
    fn enter(&self, next: Phase) -> PhaseGuard<'_> {
        let mut phase = self.phase.lock();
        if *phase != Phase::Idle {
            tracing::error!(
                current = phase.as_str(),
                entering = next.as_str(),
                "state machine phase overlap; engine contract violated"
            );
        }
        *phase = next;
        PhaseGuard { phase: &self.phase }
    }

    /// Current phase, for diagnostics.
    pub fn phase(&self) -> Phase {
        *self.phase.lock()
    }

    fn apply_set(&self, key: &str, value: Option<&[u8]>) -> ApplyResult {
        // Skip-empty-value policy: an absent or empty blob is a no-op write
        // that leaves any prior value for the key intact.
        let Some(blob) = value.filter(|v| !v.is_empty()) else {
            return ApplyResult::ok();
        };

        match self.store.set(key, blob) {
            Ok(()) => ApplyResult::with_data(blob.to_vec()),
            Err(e) => ApplyResult::err(e.to_string()),
        }
    }

    fn apply_get(&self, key: &str) -> ApplyResult {
        match self.store.get(key) {
            Ok(Some(value)) => ApplyResult::with_data(value),
            Ok(None) => ApplyResult::err("key not found"),
            Err(e) => ApplyResult::err(e.to_string()),
        }
    }

    fn apply_delete(&self, key: &str) -> ApplyResult {
        match self.store.delete(key) {
            Ok(()) => ApplyResult::ok(),
            Err(e) => ApplyResult::err(e.to_string()),
        }
    }
}

impl StateMachine for StoreStateMachine {
    fn apply(&self, entry: &[u8]) -> ApplyResult {
        let _phase = self.enter(Phase::Applying);

        let payload = match CommandPayload::decode(entry) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "undecodable committed entry, applying as no-op");
                return ApplyResult::err(format!("error unmarshalling payload: {e}"));
            }
        };

        match payload.op() {
            Some(Operation::Set) => self.apply_set(&payload.key, payload.value.as_deref()),
            Some(Operation::Get) => self.apply_get(&payload.key),
            Some(Operation::Delete) => self.apply_delete(&payload.key),
            None => {
                tracing::warn!(
                    operation = %payload.operation,
                    key = %payload.key,
                    "unrecognized operation in committed entry"
                );
                ApplyResult::default()
            }
        }
    }

    fn snapshot(&self) -> KvResult<Box<dyn SnapshotHandle>> {
        let _phase = self.enter(Phase::Snapshotting);

        // Storage already holds every applied mutation durably; see the
        // module docs in `state::snapshot`.
        Ok(Box::new(NoopSnapshot))
    }

    fn restore(&self, source: Box<dyn Read + Send>) -> KvResult<u64> {
        let _phase = self.enter(Phase::Restoring);
        let mut reader = RecordReader::new(source);
        let mut restored = 0u64;

        loop {
            match reader.next_frame()? {
                Frame::End => break,
                Frame::Corrupt { reason } => {
                    tracing::warn!(%reason, "skipping corrupt snapshot record");
                }
                Frame::Record(bytes) => match CommandPayload::decode(&bytes) {
                    Ok(payload) => {
                        let result = self.apply_set(&payload.key, payload.value.as_deref());
                        if let Some(error) = result.error {
                            tracing::warn!(key = %payload.key, %error, "restore write failed");
                        }
                        restored += 1;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping undecodable snapshot record");
                    }
                },
            }
        }

        tracing::info!(records = restored, "snapshot restore complete");
        Ok(restored)
    }
}

struct PhaseGuard<'a> {
    phase: &'a Mutex<Phase>,
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        *self.phase.lock() = Phase::Idle;
    }
}
