use std::collections::HashMap;

use bytes::Bytes;
use serde_json::Value;
use snrr_crypto::Signer;
use snrr_errors::{SnrrError, SnrrResult, TransportError};
use snrr_primitives::{AccountId, Namespace, Snode};

use crate::calls::{build_retrieve_params, parse_retrieve_body, RetrieveResult};
use crate::client::SnrrClient;
use crate::rpc_call::{local_now_ms, RpcCall};

/// `get_messages(namespaces, snode, account)` — one `batch` RPC whose
/// sub-requests are per-namespace `retrieve` calls (spec §4.6). A
/// sub-request's failure only degrades that namespace's entry; it never
/// fails the batch as a whole.
struct BatchCall {
    account: AccountId,
    namespaces: Vec<Namespace>,
    last_hashes: HashMap<Namespace, String>,
}

impl RpcCall for BatchCall {
    type Output = HashMap<Namespace, SnrrResult<RetrieveResult>>;

    fn method(&self) -> &'static str {
        "batch"
    }

    fn params(&self, signer: &dyn Signer, clock_offset_ms: i64, testnet: bool) -> Value {
        let requests: Vec<Value> = self
            .namespaces
            .iter()
            .map(|namespace| {
                let last_hash = self.last_hashes.get(namespace).cloned();
                let params = build_retrieve_params(
                    &self.account,
                    *namespace,
                    &last_hash,
                    &None,
                    signer,
                    clock_offset_ms,
                    testnet,
                );
                serde_json::json!({ "method": "retrieve", "params": params })
            })
            .collect();
        serde_json::json!({ "requests": requests })
    }

    fn parse_response(&self, body: Option<Bytes>) -> SnrrResult<Self::Output> {
        let body = body.ok_or_else(|| SnrrError::Transport(TransportError::InvalidJson("empty batch response".into())))?;
        let entries: Vec<Value> = serde_json::from_slice(&body)
            .map_err(|e| SnrrError::Transport(TransportError::InvalidJson(e.to_string())))?;

        let mut out = HashMap::with_capacity(self.namespaces.len());
        for (namespace, entry) in self.namespaces.iter().zip(entries.into_iter()) {
            let sub_result = parse_sub_response(entry);
            out.insert(*namespace, sub_result);
        }
        Ok(out)
    }

    fn account(&self) -> Option<&AccountId> {
        Some(&self.account)
    }
}

fn parse_sub_response(entry: Value) -> SnrrResult<RetrieveResult> {
    let code = entry.get("code").and_then(Value::as_u64).unwrap_or(0) as u16;
    let sub_body = entry.get("body").cloned();
    if !(200..300).contains(&code) {
        let raw = sub_body.map(|b| b.to_string()).unwrap_or_default();
        return Err(SnrrError::http_status(code, raw.into_bytes()));
    }
    let body_bytes = sub_body.map(|b| Bytes::from(b.to_string().into_bytes()));
    parse_retrieve_body(body_bytes)
}

impl SnrrClient {
    /// Fetch several namespaces for one account in a single round trip,
    /// preserving the 1-to-1 ordering between `namespaces` and the
    /// returned map's entries (spec §8, testable property 8). Each
    /// namespace's `last_hash` cursor is loaded from storage before the call
    /// and persisted back afterward, same as [`SnrrClient::retrieve`].
    pub async fn get_messages(
        &self,
        account: &AccountId,
        namespaces: Vec<Namespace>,
        snode: Snode,
    ) -> SnrrResult<HashMap<Namespace, SnrrResult<RetrieveResult>>> {
        let now_ms = local_now_ms() + self.accountant.clock_offset().offset_ms;
        let mut last_hashes = HashMap::with_capacity(namespaces.len());
        for namespace in &namespaces {
            if let Some(hash) = crate::cursor::load(self.storage.as_ref(), account, *namespace, &snode, now_ms).await? {
                last_hashes.insert(*namespace, hash);
            }
        }

        let call = BatchCall {
            account: account.clone(),
            namespaces,
            last_hashes,
        };
        let results = self.call(&call, snode.clone()).await?;

        for (namespace, result) in &results {
            if let Ok(retrieve_result) = result {
                crate::cursor::persist(self.storage.as_ref(), account, *namespace, &snode, retrieve_result).await?;
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_response_degrades_only_its_own_entry() {
        let ok_entry = serde_json::json!({"code": 200, "body": {"messages": []}});
        assert!(parse_sub_response(ok_entry).is_ok());

        let failed_entry = serde_json::json!({"code": 500, "body": {}});
        assert!(parse_sub_response(failed_entry).is_err());
    }
}
