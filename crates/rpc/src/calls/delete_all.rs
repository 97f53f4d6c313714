use std::collections::HashMap;

use bytes::Bytes;
use serde_json::Value;
use snrr_crypto::{CanonicalMessage, Signer};
use snrr_errors::{SnrrError, SnrrResult, TransportError};
use snrr_primitives::AccountId;

use crate::rpc_call::RpcCall;

/// `delete_all(namespace?, before_ms?)` — signed with the server's own
/// clock (spec §4.6: "First call `get_info`... then sign and submit the
/// delete with that timestamp"). `server_timestamp_ms` is fetched by the
/// caller (`SnrrClient::delete_all`) before this call is issued.
pub struct DeleteAllCall {
    pub account: AccountId,
    pub namespace: Option<i32>,
    pub before_ms: Option<i64>,
    pub server_timestamp_ms: i64,
}

impl RpcCall for DeleteAllCall {
    type Output = HashMap<String, bool>;

    fn method(&self) -> &'static str {
        if self.before_ms.is_some() {
            "delete_all_before"
        } else {
            "delete_all"
        }
    }

    fn params(&self, signer: &dyn Signer, _clock_offset_ms: i64, testnet: bool) -> Value {
        let message = CanonicalMessage::DeleteAll {
            namespace: self.namespace,
            timestamp_ms: self.server_timestamp_ms,
        };
        let signature = signer.sign(&message.to_bytes());

        let mut params = serde_json::json!({
            "pubkey": self.account.wire_pubkey(testnet),
            "timestamp": self.server_timestamp_ms,
            "pubkey_ed25519": hex::encode(signer.ed25519_public()),
            "signature": signature.to_hex(),
        });
        if let Some(namespace) = self.namespace {
            params["namespace"] = Value::from(namespace);
        }
        if let Some(before_ms) = self.before_ms {
            params["before"] = Value::from(before_ms);
        }
        params
    }

    fn parse_response(&self, body: Option<Bytes>) -> SnrrResult<Self::Output> {
        let body = body.ok_or_else(|| SnrrError::Transport(TransportError::InvalidJson("empty delete_all response".into())))?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| SnrrError::Transport(TransportError::InvalidJson(e.to_string())))?;

        let mut out = HashMap::new();
        if let Some(swarm) = value.get("swarm").and_then(Value::as_object) {
            for (snode_pk, entry) in swarm {
                let ok = entry
                    .get("deleted")
                    .and_then(Value::as_array)
                    .is_some_and(|d| !d.is_empty());
                out.insert(snode_pk.clone(), ok);
            }
        }
        Ok(out)
    }

    fn account(&self) -> Option<&AccountId> {
        Some(&self.account)
    }
}
