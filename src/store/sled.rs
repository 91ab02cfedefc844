//! Sled-backed storage engine.

use std::path::Path;

use sled::transaction::{TransactionError, TransactionResult};
use sled::Db;

use crate::error::{KvError, KvResult};

use super::StorageEngine;

fn txn_error(e: TransactionError<()>) -> KvError {
    match e {
        TransactionError::Abort(()) => KvError::storage("transaction aborted"),
        TransactionError::Storage(e) => KvError::storage(e),
    }
}

/// Storage engine backed by a sled database.
///
/// Sled persists every applied mutation durably on its own, independently of
/// the consensus log; that property is what lets the snapshot adapter get
/// away with a no-op persist.
pub struct SledStore {
    db: Db,
}

impl SledStore {
    /// Open (or create) the database at `path`.
    ///
    /// Failure here is fatal at startup: the node must not serve traffic
    /// against half-initialized storage.
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        let db = sled::open(path.as_ref()).map_err(KvError::storage)?;
        Ok(Self { db })
    }

    /// Open a throwaway in-memory-ish database for tests.
    pub fn temporary() -> KvResult<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(KvError::storage)?;
        Ok(Self { db })
    }
}

impl StorageEngine for SledStore {
    fn get(&self, key: &str) -> KvResult<Option<Vec<u8>>> {
        let result: TransactionResult<Option<sled::IVec>, ()> =
            self.db.transaction(|tx| Ok(tx.get(key.as_bytes())?));

        match result {
            Ok(value) => Ok(value.map(|v| v.to_vec())),
            Err(e) => Err(txn_error(e)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> KvResult<()> {
        let result: TransactionResult<(), ()> = self.db.transaction(|tx| {
            tx.insert(key.as_bytes(), value)?;
            Ok(())
        });

        result.map_err(txn_error)
    }

    fn delete(&self, key: &str) -> KvResult<()> {
        let result: TransactionResult<(), ()> = self.db.transaction(|tx| {
            tx.remove(key.as_bytes())?;
            Ok(())
        });

        result.map_err(txn_error)
    }

    fn flush(&self) -> KvResult<()> {
        self.db.flush().map_err(KvError::storage)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_delete() {
        let store = SledStore::temporary().unwrap();

        store.set("a", b"1").unwrap();
        assert_eq!(store.get("a").unwrap(), Some(b"1".to_vec()));

        store.delete("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn delete_absent_key_is_ok() {
        let store = SledStore::temporary().unwrap();
        store.delete("missing").unwrap();
    }

    #[test]
    fn set_overwrites() {
        let store = SledStore::temporary().unwrap();

        store.set("a", b"1").unwrap();
        store.set("a", b"2").unwrap();

        assert_eq!(store.get("a").unwrap(), Some(b"2".to_vec()));
    }
}
