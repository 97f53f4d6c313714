//! Per-account swarm resolver (component C4): caches the set of snodes
//! responsible for an account's data, fetching lazily via `get_swarm` and
//! coalescing concurrent callers for the same account into one fetch.

mod fetch;

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use rand::seq::SliceRandom;
use snrr_errors::{ProtocolError, SnrrError, SnrrResult};
use snrr_http::HttpEngine;
use snrr_primitives::{AccountId, Snode, MIN_SWARM};
use snrr_storage::{Persistence, StorageKey};
use tokio::sync::Mutex as AsyncMutex;

pub use fetch::fetch_swarm;

/// Two target snodes a `send_message` fan-out addresses, per account
/// (spec §9 open question: the source bound "all target snodes" to a
/// tunable count of 2; kept configurable here rather than hard-coded).
pub const DEFAULT_TARGET_SWARM_SNODE_COUNT: usize = 2;

#[derive(Default)]
struct AccountState {
    snodes: HashSet<Snode>,
    fetch_lock: Arc<AsyncMutex<()>>,
}

/// The process-wide per-account swarm cache.
pub struct SwarmResolver {
    engine: Arc<dyn HttpEngine>,
    storage: Arc<dyn Persistence>,
    accounts: DashMap<String, AccountState>,
}

impl SwarmResolver {
    pub fn new(engine: Arc<dyn HttpEngine>, storage: Arc<dyn Persistence>) -> Self {
        Self {
            engine,
            storage,
            accounts: DashMap::new(),
        }
    }

    /// Return the account's swarm, fetching it if the cache is stale.
    /// Concurrent callers for the same account coalesce: the second caller
    /// blocks on the account's fetch lock, then re-checks the cache and
    /// finds it already populated rather than issuing a second fetch.
    pub async fn swarm_for(&self, account: &AccountId, pool: &[Snode]) -> SnrrResult<HashSet<Snode>> {
        if let Some(cached) = self.cached(account) {
            if cached.len() >= MIN_SWARM {
                return Ok(cached);
            }
        }

        let lock = self
            .accounts
            .entry(account.as_hex().to_string())
            .or_default()
            .fetch_lock
            .clone();

        // Concurrent callers for the same account block here; whoever gets
        // the lock first fetches, and everyone behind it re-checks the
        // cache below before deciding it still needs to fetch.
        let _guard = lock.lock().await;

        if let Some(cached) = self.cached(account) {
            if cached.len() >= MIN_SWARM {
                return Ok(cached);
            }
        }

        self.fetch_and_cache(account, pool).await
    }

    fn cached(&self, account: &AccountId) -> Option<HashSet<Snode>> {
        self.accounts.get(account.as_hex()).map(|s| s.snodes.clone())
    }

    async fn fetch_and_cache(&self, account: &AccountId, pool: &[Snode]) -> SnrrResult<HashSet<Snode>> {
        let snode = pool
            .choose(&mut rand::thread_rng())
            .ok_or_else(|| SnrrError::Protocol(ProtocolError::InsufficientSnodes { needed: 1, have: 0 }))?;

        let fetched = fetch_swarm(&self.engine, snode, account).await?;

        if let Some(mut entry) = self.accounts.get_mut(account.as_hex()) {
            entry.snodes = fetched.clone();
        }

        self.persist(account, &fetched).await?;
        Ok(fetched)
    }

    async fn persist(&self, account: &AccountId, snodes: &HashSet<Snode>) -> SnrrResult<()> {
        let blob = serde_json::to_vec(&snodes.iter().collect::<Vec<_>>()).unwrap_or_default();
        self.storage
            .put(&StorageKey::Swarm(account.as_hex().to_string()), blob)
            .await
            .map_err(|e| SnrrError::Protocol(ProtocolError::SnodePoolUpdatingFailed(e.to_string())))
    }

    /// `shuffle(swarm).take(n)` using a cryptographically secure RNG.
    pub fn target_snodes(&self, account: &AccountId, count: usize) -> Vec<Snode> {
        let mut snodes: Vec<Snode> = self.cached(account).map(|s| s.into_iter().collect()).unwrap_or_default();
        snodes.shuffle(&mut rand::thread_rng());
        snodes.into_iter().take(count).collect()
    }

    /// Remove a single snode from an account's swarm and persist.
    pub async fn drop_from_swarm(&self, account: &AccountId, snode: &Snode) -> SnrrResult<()> {
        if let Some(mut entry) = self.accounts.get_mut(account.as_hex()) {
            entry.snodes.remove(snode);
            let remaining = entry.snodes.clone();
            drop(entry);
            self.persist(account, &remaining).await?;
        }
        Ok(())
    }

    /// Replace an account's swarm outright (spec §4.8: 421 response with a
    /// non-empty `snodes` array).
    pub async fn replace_swarm(&self, account: &AccountId, snodes: HashSet<Snode>) -> SnrrResult<()> {
        self.accounts
            .entry(account.as_hex().to_string())
            .and_modify(|s| s.snodes = snodes.clone())
            .or_insert_with(|| AccountState {
                snodes: snodes.clone(),
                fetch_lock: Arc::new(AsyncMutex::new(())),
            });
        self.persist(account, &snodes).await
    }

    /// Empty the cached set so the next call refetches (spec §4.8: a 421
    /// with no usable `snodes` array invalidates rather than replaces).
    pub async fn invalidate(&self, account: &AccountId) -> SnrrResult<()> {
        if let Some(mut entry) = self.accounts.get_mut(account.as_hex()) {
            entry.snodes.clear();
        }
        self.storage
            .delete(&StorageKey::Swarm(account.as_hex().to_string()))
            .await
            .map_err(|e| SnrrError::Protocol(ProtocolError::SnodePoolUpdatingFailed(e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use http::{HeaderMap, Method, StatusCode};
    use snrr_http::HttpResponse;
    use snrr_storage::MemoryPersistence;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    struct StaticEngine {
        body: bytes::Bytes,
    }

    #[async_trait]
    impl HttpEngine for StaticEngine {
        async fn execute(
            &self,
            _method: Method,
            _url: &str,
            _headers: HeaderMap,
            _body: Option<bytes::Bytes>,
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

    fn pool_snode() -> Snode {
        Snode::new("10.0.0.1".parse().unwrap(), 4433, [9u8; 32], [9u8; 32])
    }

    fn swarm_body() -> bytes::Bytes {
        let nodes: Vec<_> = (0..5)
            .map(|b| {
                serde_json::json!({
                    "ip": "10.0.0.2",
                    "port": 4433,
                    "pubkey_ed25519": hex::encode([b; 32]),
                    "pubkey_x25519": hex::encode([b; 32]),
                })
            })
            .collect();
        serde_json::to_vec(&serde_json::json!({ "snodes": nodes })).unwrap().into()
    }

    #[tokio::test]
    async fn swarm_for_fetches_and_caches() {
        let engine: Arc<dyn HttpEngine> = Arc::new(StaticEngine { body: swarm_body() });
        let storage: Arc<dyn Persistence> = Arc::new(MemoryPersistence::new());
        let resolver = SwarmResolver::new(engine, storage);
        let account = AccountId::from_hex("05aa".to_string() + &"ff".repeat(32));

        let swarm = resolver.swarm_for(&account, &[pool_snode()]).await.unwrap();
        assert_eq!(swarm.len(), 5);
        assert_eq!(resolver.cached(&account).unwrap().len(), 5);
    }

    #[tokio::test]
    async fn target_snodes_never_exceeds_requested_count() {
        let engine: Arc<dyn HttpEngine> = Arc::new(StaticEngine { body: swarm_body() });
        let storage: Arc<dyn Persistence> = Arc::new(MemoryPersistence::new());
        let resolver = SwarmResolver::new(engine, storage);
        let account = AccountId::from_hex("05aa".to_string() + &"ff".repeat(32));
        resolver.swarm_for(&account, &[pool_snode()]).await.unwrap();

        assert_eq!(resolver.target_snodes(&account, 2).len(), 2);
    }
}
