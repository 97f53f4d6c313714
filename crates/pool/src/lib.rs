//! Snode-pool cache (component C3): bootstrap discovery from seed nodes,
//! peer-agreement refresh, and durable persistence of the resulting set.

mod bootstrap;
mod seeds;

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use snrr_errors::{SnrrError, SnrrResult};
use snrr_http::HttpEngine;
use snrr_primitives::{Snode, MIN_POOL, POOL_REFRESH_INTERVAL_SECS};
use snrr_storage::{Persistence, StorageKey};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

pub use bootstrap::{bootstrap_from_seeds, refresh_from_peers};
pub use seeds::{seed_urls, MAINNET_SEED_URLS, TESTNET_SEED_URLS};

/// A read-only snapshot of the pool's health, cheap to clone for logging
/// and the demo binary — pairing mutable internal state with a read-only
/// snapshot type is the same shape the teacher workspace uses for its
/// connection-pool metrics.
#[derive(Debug, Clone, Copy)]
pub struct PoolMetrics {
    pub len: usize,
    pub last_refresh_unix_ms: Option<i64>,
}

/// The process-wide snode-pool cache. Bootstrap and peer refresh are
/// mutually exclusive: [`Self::ensure_ready`] and [`Self::refresh`] take an
/// async mutex around the whole refresh operation, so concurrent callers
/// racing a stale cache dedup into a single underlying fetch — the second
/// caller blocks on the mutex, then re-checks freshness and finds it
/// satisfied rather than triggering a second fetch.
pub struct SnodePool {
    engine: Arc<dyn HttpEngine>,
    storage: Arc<dyn Persistence>,
    testnet: bool,
    snodes: RwLock<HashSet<Snode>>,
    last_refresh_unix_ms: RwLock<Option<i64>>,
    refresh_lock: AsyncMutex<()>,
}

impl SnodePool {
    pub fn new(engine: Arc<dyn HttpEngine>, storage: Arc<dyn Persistence>, testnet: bool) -> Self {
        Self {
            engine,
            storage,
            testnet,
            snodes: RwLock::new(HashSet::new()),
            last_refresh_unix_ms: RwLock::new(None),
            refresh_lock: AsyncMutex::new(()),
        }
    }

    pub fn metrics(&self) -> PoolMetrics {
        PoolMetrics {
            len: self.snodes.read().len(),
            last_refresh_unix_ms: *self.last_refresh_unix_ms.read(),
        }
    }

    fn is_fresh(&self, now_unix_ms: i64) -> bool {
        let fresh_enough = self
            .last_refresh_unix_ms
            .read()
            .is_some_and(|t| now_unix_ms - t < POOL_REFRESH_INTERVAL_SECS as i64 * 1000);
        self.snodes.read().len() >= MIN_POOL && fresh_enough
    }

    /// Restore a previously persisted pool from storage, if any. Call once
    /// at startup before the first `ensure_ready`.
    pub async fn load_from_storage(&self) -> SnrrResult<()> {
        if let Some(blob) = self
            .storage
            .get(&StorageKey::SnodePool)
            .await
            .map_err(|e| protocol_error(e.to_string()))?
        {
            if let Ok(snodes) = serde_json::from_slice::<Vec<Snode>>(&blob) {
                *self.snodes.write() = snodes.into_iter().collect();
            }
        }
        if let Some(blob) = self
            .storage
            .get(&StorageKey::LastPoolRefresh)
            .await
            .map_err(|e| protocol_error(e.to_string()))?
        {
            if let Ok(bytes) = blob.try_into() {
                *self.last_refresh_unix_ms.write() = Some(i64::from_le_bytes(bytes));
            }
        }
        Ok(())
    }

    /// Return the cached pool if fresh; otherwise refresh first.
    pub async fn ensure_ready(&self, now_unix_ms: i64) -> SnrrResult<HashSet<Snode>> {
        if self.is_fresh(now_unix_ms) {
            return Ok(self.snodes.read().clone());
        }
        self.refresh(now_unix_ms).await
    }

    /// Bootstrap from seeds if the pool is below [`MIN_POOL`]; otherwise
    /// refresh from peers, falling back to seeds if peer agreement fails.
    pub async fn refresh(&self, now_unix_ms: i64) -> SnrrResult<HashSet<Snode>> {
        let _guard = self.refresh_lock.lock().await;

        if self.is_fresh(now_unix_ms) {
            return Ok(self.snodes.read().clone());
        }

        let current_len = self.snodes.read().len();
        let fetched = if current_len < MIN_POOL {
            bootstrap_from_seeds(&self.engine, self.testnet).await?
        } else {
            let current: Vec<Snode> = self.snodes.read().iter().cloned().collect();
            match refresh_from_peers(&self.engine, &current).await {
                Ok(nodes) => nodes,
                Err(err) => {
                    warn!(error = %err, "peer refresh failed, falling back to seeds");
                    bootstrap_from_seeds(&self.engine, self.testnet).await?
                }
            }
        };

        info!(count = fetched.len(), "snode pool refreshed");
        self.replace(fetched, now_unix_ms).await
    }

    async fn replace(&self, snodes: Vec<Snode>, now_unix_ms: i64) -> SnrrResult<HashSet<Snode>> {
        let set: HashSet<Snode> = snodes.into_iter().collect();
        *self.snodes.write() = set.clone();
        *self.last_refresh_unix_ms.write() = Some(now_unix_ms);

        let pool_blob = serde_json::to_vec(&set.iter().collect::<Vec<_>>()).unwrap_or_default();
        self.storage
            .tx(vec![
                snrr_storage::WriteOp::Put(StorageKey::SnodePool, pool_blob),
                snrr_storage::WriteOp::Put(StorageKey::LastPoolRefresh, now_unix_ms.to_le_bytes().to_vec()),
            ])
            .await
            .map_err(|e| protocol_error(e.to_string()))?;

        Ok(set)
    }

    /// Remove a single snode from the pool (spec §4.3: triggered by the
    /// failure accountant once a snode crosses the drop threshold).
    pub async fn drop_snode(&self, snode: &Snode) -> SnrrResult<()> {
        self.snodes.write().remove(snode);
        let set: Vec<Snode> = self.snodes.read().iter().cloned().collect();
        let pool_blob = serde_json::to_vec(&set).unwrap_or_default();
        self.storage
            .put(&StorageKey::SnodePool, pool_blob)
            .await
            .map_err(|e| protocol_error(e.to_string()))
    }

    /// Empty the in-memory and persisted pool.
    pub async fn clear(&self) -> SnrrResult<()> {
        self.snodes.write().clear();
        *self.last_refresh_unix_ms.write() = None;
        self.storage
            .delete(&StorageKey::SnodePool)
            .await
            .map_err(|e| protocol_error(e.to_string()))?;
        self.storage
            .delete(&StorageKey::LastPoolRefresh)
            .await
            .map_err(|e| protocol_error(e.to_string()))
    }
}

fn protocol_error(message: String) -> SnrrError {
    SnrrError::Protocol(snrr_errors::ProtocolError::SnodePoolUpdatingFailed(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use http::{HeaderMap, Method, StatusCode};
    use snrr_http::HttpResponse;
    use snrr_storage::MemoryPersistence;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    struct StaticEngine {
        body: Bytes,
    }

    #[async_trait]
    impl HttpEngine for StaticEngine {
        async fn execute(
            &self,
            _method: Method,
            _url: &str,
            _headers: HeaderMap,
            _body: Option<Bytes>,
            _timeout: Duration,
            _cancel: CancellationToken,
        ) -> SnrrResult<HttpResponse> {
            Ok(HttpResponse {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                body: self.body.clone(),
            })
        }
    }

    fn snode_json(byte: u8) -> serde_json::Value {
        serde_json::json!({
            "ip": "10.0.0.1",
            "port": 4433,
            "pubkey_ed25519": hex::encode([byte; 32]),
            "pubkey_x25519": hex::encode([byte; 32]),
        })
    }

    #[tokio::test]
    async fn ensure_ready_bootstraps_when_empty() {
        let nodes: Vec<_> = (0..20).map(snode_json).collect();
        let body = serde_json::to_vec(&serde_json::json!({ "nodes": nodes })).unwrap();
        let engine: Arc<dyn HttpEngine> = Arc::new(StaticEngine { body: body.into() });
        let storage: Arc<dyn Persistence> = Arc::new(MemoryPersistence::new());
        let pool = SnodePool::new(engine, storage, false);

        let result = pool.ensure_ready(0).await.unwrap();
        assert_eq!(result.len(), 20);
        assert_eq!(pool.metrics().len, 20);
    }

    #[tokio::test]
    async fn clear_empties_pool_and_persisted_state() {
        let nodes: Vec<_> = (0..20).map(snode_json).collect();
        let body = serde_json::to_vec(&serde_json::json!({ "nodes": nodes })).unwrap();
        let engine: Arc<dyn HttpEngine> = Arc::new(StaticEngine { body: body.into() });
        let storage: Arc<dyn Persistence> = Arc::new(MemoryPersistence::new());
        let pool = SnodePool::new(engine, storage, false);
        pool.ensure_ready(0).await.unwrap();

        pool.clear().await.unwrap();
        assert_eq!(pool.metrics().len, 0);
    }
}
