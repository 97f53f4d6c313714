//! Persistence adapters (component C9).
//!
//! A narrow transactional key-value interface (spec §9 design note: "no
//! leakage of the underlying store into other components") with two
//! implementations — an in-memory map for tests and short-lived processes,
//! and a [`redb`]-backed store for durable persistence across restarts.

mod memory;
mod redb_backend;

pub use memory::MemoryPersistence;
pub use redb_backend::RedbPersistence;

use std::fmt;

use async_trait::async_trait;

/// One logical key in the persisted state (§4.9). Rendered to a storage
/// string via [`StorageKey::encode`] rather than used as a raw enum, so the
/// wire format stays stable even if variants are reordered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageKey {
    SnodePool,
    LastPoolRefresh,
    Swarm(String),
    LastHash { account: String, namespace: i32, snode: String },
    ClockOffsetMs,
    Hardfork,
    Softfork,
    SelectedLayers,
}

impl StorageKey {
    pub fn encode(&self) -> String {
        match self {
            Self::SnodePool => "snode_pool".to_string(),
            Self::LastPoolRefresh => "last_pool_refresh".to_string(),
            Self::Swarm(account) => format!("swarm:{account}"),
            Self::LastHash { account, namespace, snode } => {
                format!("last_hash:{account}:{namespace}:{snode}")
            }
            Self::ClockOffsetMs => "clock_offset_ms".to_string(),
            Self::Hardfork => "hardfork".to_string(),
            Self::Softfork => "softfork".to_string(),
            Self::SelectedLayers => "selected_layers".to_string(),
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

/// A single read/write/delete issued as part of one atomic transaction.
pub enum WriteOp {
    Put(StorageKey, Vec<u8>),
    Delete(StorageKey),
}

/// Errors from the persistence layer. Kept separate from [`snrr_errors::SnrrError`]
/// since storage failures are infrastructure-level, not protocol-level —
/// callers that want them folded into the router's error taxonomy wrap them
/// explicitly (see `snrr-pool`/`snrr-swarm`'s use of
/// [`snrr_errors::ProtocolError::SnodePoolUpdatingFailed`]).
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("backend error: {0}")]
    Backend(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// The narrow persistence contract every `snrr-*` component depends on.
/// Four operations, matching the design note exactly: `get`, `put`,
/// `delete`, `tx` (a batch of the above, committed atomically).
#[async_trait]
pub trait Persistence: Send + Sync {
    async fn get(&self, key: &StorageKey) -> StorageResult<Option<Vec<u8>>>;
    async fn put(&self, key: &StorageKey, value: Vec<u8>) -> StorageResult<()>;
    async fn delete(&self, key: &StorageKey) -> StorageResult<()>;
    /// Apply every op in `ops` atomically: either all are visible to the
    /// next `get`, or none are.
    async fn tx(&self, ops: Vec<WriteOp>) -> StorageResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_hash_key_matches_spec_format() {
        let key = StorageKey::LastHash {
            account: "05aa".into(),
            namespace: -10,
            snode: "abcd".into(),
        };
        assert_eq!(key.encode(), "last_hash:05aa:-10:abcd");
    }

    #[test]
    fn swarm_key_is_namespaced_by_account() {
        assert_eq!(StorageKey::Swarm("05aa".into()).encode(), "swarm:05aa");
    }
}
