//! Local read path.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{KvError, KvResult};
use crate::store::StorageEngine;

use super::validate_key;

/// Serves point reads directly from local storage.
///
/// Reads bypass consensus entirely, so they are only as fresh as this
/// node's last-applied index: read-your-local-writes on the leader,
/// eventually consistent on followers, explicitly not linearizable.
pub struct LocalReader {
    store: Arc<dyn StorageEngine>,
}

impl LocalReader {
    /// Create a reader over the injected storage handle.
    pub fn new(store: Arc<dyn StorageEngine>) -> Self {
        Self { store }
    }

    /// Fetch and deserialize the value for `key`.
    ///
    /// An absent key is reported as [`KvError::KeyNotFound`], distinct from
    /// storage or decoding failures.
    pub fn get(&self, key: &str) -> KvResult<Value> {
        let key = validate_key(key)?;

        let Some(bytes) = self.store.get(key)? else {
            return Err(KvError::KeyNotFound {
                key: key.to_string(),
            });
        };

        if bytes.is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}
