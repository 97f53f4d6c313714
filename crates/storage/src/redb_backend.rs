use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};

use crate::{Persistence, StorageError, StorageKey, StorageResult, WriteOp};

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("snrr_state");

/// A [`redb`] single-file embedded store. `redb`'s operations are
/// synchronous; every call here is moved onto a blocking thread so the
/// async callers above it (pool refresh, swarm fetch) never stall the
/// runtime's worker threads on disk I/O.
pub struct RedbPersistence {
    db: Arc<Database>,
}

impl RedbPersistence {
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path).map_err(|e| StorageError::Backend(e.to_string()))?;
        {
            let write_txn = db.begin_write().map_err(|e| StorageError::Backend(e.to_string()))?;
            write_txn
                .open_table(TABLE)
                .map_err(|e| StorageError::Backend(e.to_string()))?;
            write_txn.commit().map_err(|e| StorageError::Backend(e.to_string()))?;
        }
        Ok(Self { db: Arc::new(db) })
    }
}

#[async_trait]
impl Persistence for RedbPersistence {
    async fn get(&self, key: &StorageKey) -> StorageResult<Option<Vec<u8>>> {
        let db = self.db.clone();
        let encoded = key.encode();
        tokio::task::spawn_blocking(move || {
            let txn = db.begin_read().map_err(|e| StorageError::Backend(e.to_string()))?;
            let table = txn.open_table(TABLE).map_err(|e| StorageError::Backend(e.to_string()))?;
            let value = table
                .get(encoded.as_str())
                .map_err(|e| StorageError::Backend(e.to_string()))?
                .map(|guard| guard.value().to_vec());
            Ok(value)
        })
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?
    }

    async fn put(&self, key: &StorageKey, value: Vec<u8>) -> StorageResult<()> {
        self.tx(vec![WriteOp::Put(key.clone(), value)]).await
    }

    async fn delete(&self, key: &StorageKey) -> StorageResult<()> {
        self.tx(vec![WriteOp::Delete(key.clone())]).await
    }

    async fn tx(&self, ops: Vec<WriteOp>) -> StorageResult<()> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let write_txn = db.begin_write().map_err(|e| StorageError::Backend(e.to_string()))?;
            {
                let mut table = write_txn.open_table(TABLE).map_err(|e| StorageError::Backend(e.to_string()))?;
                for op in ops {
                    match op {
                        WriteOp::Put(key, value) => {
                            table
                                .insert(key.encode().as_str(), value.as_slice())
                                .map_err(|e| StorageError::Backend(e.to_string()))?;
                        }
                        WriteOp::Delete(key) => {
                            table
                                .remove(key.encode().as_str())
                                .map_err(|e| StorageError::Backend(e.to_string()))?;
                        }
                    }
                }
            }
            write_txn.commit().map_err(|e| StorageError::Backend(e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips_across_a_reopened_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snrr.redb");

        {
            let store = RedbPersistence::open(&path).unwrap();
            store.put(&StorageKey::Hardfork, vec![19]).await.unwrap();
        }

        let reopened = RedbPersistence::open(&path).unwrap();
        assert_eq!(reopened.get(&StorageKey::Hardfork).await.unwrap(), Some(vec![19]));
    }

    #[tokio::test]
    async fn tx_commits_multiple_keys_together() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbPersistence::open(dir.path().join("snrr.redb")).unwrap();
        store
            .tx(vec![
                WriteOp::Put(StorageKey::ClockOffsetMs, vec![1]),
                WriteOp::Put(StorageKey::SelectedLayers, vec![2]),
            ])
            .await
            .unwrap();
        assert_eq!(store.get(&StorageKey::ClockOffsetMs).await.unwrap(), Some(vec![1]));
        assert_eq!(store.get(&StorageKey::SelectedLayers).await.unwrap(), Some(vec![2]));
    }
}
