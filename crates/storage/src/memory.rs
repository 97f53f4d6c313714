use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{Persistence, StorageError, StorageKey, StorageResult, WriteOp};

/// An in-memory [`Persistence`] backend. Used by tests and by any process
/// that opts out of durable persistence (e.g. a short-lived CLI invocation).
#[derive(Default)]
pub struct MemoryPersistence {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Persistence for MemoryPersistence {
    async fn get(&self, key: &StorageKey) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.read().get(&key.encode()).cloned())
    }

    async fn put(&self, key: &StorageKey, value: Vec<u8>) -> StorageResult<()> {
        self.data.write().insert(key.encode(), value);
        Ok(())
    }

    async fn delete(&self, key: &StorageKey) -> StorageResult<()> {
        self.data.write().remove(&key.encode());
        Ok(())
    }

    async fn tx(&self, ops: Vec<WriteOp>) -> StorageResult<()> {
        let mut data = self.data.write();
        for op in ops {
            match op {
                WriteOp::Put(key, value) => {
                    data.insert(key.encode(), value);
                }
                WriteOp::Delete(key) => {
                    data.remove(&key.encode());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = MemoryPersistence::new();
        store.put(&StorageKey::ClockOffsetMs, vec![1, 2, 3]).await.unwrap();
        assert_eq!(store.get(&StorageKey::ClockOffsetMs).await.unwrap(), Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn tx_applies_all_ops_atomically() {
        let store = MemoryPersistence::new();
        store
            .tx(vec![
                WriteOp::Put(StorageKey::Hardfork, vec![1]),
                WriteOp::Put(StorageKey::Softfork, vec![2]),
            ])
            .await
            .unwrap();
        assert_eq!(store.get(&StorageKey::Hardfork).await.unwrap(), Some(vec![1]));
        assert_eq!(store.get(&StorageKey::Softfork).await.unwrap(), Some(vec![2]));
    }

    #[tokio::test]
    async fn delete_removes_the_key() {
        let store = MemoryPersistence::new();
        store.put(&StorageKey::SnodePool, vec![9]).await.unwrap();
        store.delete(&StorageKey::SnodePool).await.unwrap();
        assert_eq!(store.get(&StorageKey::SnodePool).await.unwrap(), None);
    }
}
