//! Persisted `last_hash` retrieval cursors (spec §3/§6/§8 S3): one entry per
//! `(account, namespace, snode)`, used to resume a `retrieve` from where the
//! previous call left off, and pruned once the message it points at has
//! expired.

use serde_json::Value;
use snrr_errors::{ProtocolError, SnrrError, SnrrResult};
use snrr_primitives::{AccountId, Namespace, Snode};
use snrr_storage::{Persistence, StorageKey};

use crate::calls::RetrieveResult;

fn storage_key(account: &AccountId, namespace: Namespace, snode: &Snode) -> StorageKey {
    StorageKey::LastHash {
        account: account.as_hex().to_string(),
        namespace: namespace.value(),
        snode: snode.ed25519_hex(),
    }
}

fn storage_err(e: snrr_storage::StorageError) -> SnrrError {
    SnrrError::Protocol(ProtocolError::SnodePoolUpdatingFailed(e.to_string()))
}

/// Load the persisted cursor for a `(account, namespace, snode)` triple,
/// pruning and discarding it if the message it points at has since expired
/// (spec §3: `LastHash`... pruned when its `expiration_ms < now`).
pub(crate) async fn load(
    storage: &dyn Persistence,
    account: &AccountId,
    namespace: Namespace,
    snode: &Snode,
    now_ms: i64,
) -> SnrrResult<Option<String>> {
    let key = storage_key(account, namespace, snode);
    let Some(blob) = storage.get(&key).await.map_err(storage_err)? else {
        return Ok(None);
    };
    let Ok(entry) = serde_json::from_slice::<Value>(&blob) else {
        return Ok(None);
    };
    let hash = entry.get("hash").and_then(Value::as_str).map(str::to_string);
    let expiration_ms = entry.get("expiration_ms").and_then(Value::as_i64).unwrap_or(0);

    if expiration_ms < now_ms {
        storage.delete(&key).await.map_err(storage_err)?;
        return Ok(None);
    }
    Ok(hash)
}

/// Persist the cursor returned by a `retrieve`, only if it actually returned
/// at least one message (spec §8 S3: `last_hash` updated for each namespace
/// only if at least one message was returned).
pub(crate) async fn persist(
    storage: &dyn Persistence,
    account: &AccountId,
    namespace: Namespace,
    snode: &Snode,
    result: &RetrieveResult,
) -> SnrrResult<()> {
    let Some(last_message) = result.messages.last() else {
        return Ok(());
    };
    let key = storage_key(account, namespace, snode);
    let blob = serde_json::json!({
        "hash": last_message.hash,
        "expiration_ms": last_message.expiration_ms,
    })
    .to_string()
    .into_bytes();
    storage.put(&key, blob).await.map_err(storage_err)
}

#[cfg(test)]
mod tests {
    use snrr_primitives::ReceivedMessage;
    use snrr_storage::MemoryPersistence;

    use super::*;

    fn account() -> AccountId {
        AccountId::from_hex("05aa")
    }

    fn snode() -> Snode {
        Snode::new("127.0.0.1".parse().unwrap(), 1000, [7u8; 32], [7u8; 32])
    }

    fn message(hash: &str, expiration_ms: i64) -> ReceivedMessage {
        ReceivedMessage {
            hash: hash.to_string(),
            ciphertext: vec![1, 2, 3],
            timestamp_ms: 0,
            expiration_ms,
            namespace: Namespace::DEFAULT,
        }
    }

    #[tokio::test]
    async fn round_trips_through_storage() {
        let storage = MemoryPersistence::new();
        let result = RetrieveResult { messages: vec![message("h1", 10_000)], last_hash: Some("h1".into()) };
        persist(&storage, &account(), Namespace::DEFAULT, &snode(), &result).await.unwrap();

        let loaded = load(&storage, &account(), Namespace::DEFAULT, &snode(), 5_000).await.unwrap();
        assert_eq!(loaded, Some("h1".to_string()));
    }

    #[tokio::test]
    async fn empty_result_leaves_cursor_untouched() {
        let storage = MemoryPersistence::new();
        let result = RetrieveResult { messages: vec![message("h1", 10_000)], last_hash: Some("h1".into()) };
        persist(&storage, &account(), Namespace::DEFAULT, &snode(), &result).await.unwrap();

        let empty = RetrieveResult { messages: vec![], last_hash: None };
        persist(&storage, &account(), Namespace::DEFAULT, &snode(), &empty).await.unwrap();

        let loaded = load(&storage, &account(), Namespace::DEFAULT, &snode(), 5_000).await.unwrap();
        assert_eq!(loaded, Some("h1".to_string()));
    }

    #[tokio::test]
    async fn expired_cursor_is_pruned_and_dropped() {
        let storage = MemoryPersistence::new();
        let result = RetrieveResult { messages: vec![message("h1", 1_000)], last_hash: Some("h1".into()) };
        persist(&storage, &account(), Namespace::DEFAULT, &snode(), &result).await.unwrap();

        let loaded = load(&storage, &account(), Namespace::DEFAULT, &snode(), 5_000).await.unwrap();
        assert_eq!(loaded, None);

        let key = storage_key(&account(), Namespace::DEFAULT, &snode());
        assert!(storage.get(&key).await.unwrap().is_none());
    }
}
