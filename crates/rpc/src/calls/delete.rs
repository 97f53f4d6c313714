use std::collections::HashMap;

use bytes::Bytes;
use serde_json::Value;
use snrr_crypto::{CanonicalMessage, Signer};
use snrr_errors::{SnrrError, SnrrResult, TransportError};
use snrr_primitives::AccountId;

use crate::rpc_call::RpcCall;

/// `delete_messages(hashes, account)` — bulk endpoint: per-snode outcome is
/// reported rather than raised, since one stale swarm member should not
/// fail the whole call (spec §4.5/§7).
pub struct DeleteCall {
    pub account: AccountId,
    pub hashes: Vec<String>,
}

impl RpcCall for DeleteCall {
    type Output = HashMap<String, bool>;

    fn method(&self) -> &'static str {
        "delete"
    }

    fn params(&self, signer: &dyn Signer, _clock_offset_ms: i64, testnet: bool) -> Value {
        let message = CanonicalMessage::Delete { hashes: &self.hashes };
        let signature = signer.sign(&message.to_bytes());
        serde_json::json!({
            "pubkey": self.account.wire_pubkey(testnet),
            "messages": self.hashes,
            "pubkey_ed25519": hex::encode(signer.ed25519_public()),
            "signature": signature.to_hex(),
        })
    }

    fn parse_response(&self, body: Option<Bytes>) -> SnrrResult<Self::Output> {
        let body = body.ok_or_else(|| SnrrError::Transport(TransportError::InvalidJson("empty delete response".into())))?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| SnrrError::Transport(TransportError::InvalidJson(e.to_string())))?;

        let mut out = HashMap::new();
        if let Some(swarm) = value.get("swarm").and_then(Value::as_object) {
            for (snode_pk, entry) in swarm {
                let deleted = entry
                    .get("deleted")
                    .and_then(Value::as_array)
                    .is_some_and(|d| !d.is_empty());
                out.insert(snode_pk.clone(), deleted);
            }
        }
        Ok(out)
    }

    fn account(&self) -> Option<&AccountId> {
        Some(&self.account)
    }
}
