use std::collections::HashMap;

use bytes::Bytes;
use serde_json::Value;
use snrr_crypto::{CanonicalMessage, Signer};
use snrr_errors::{SnrrError, SnrrResult, TransportError};
use snrr_primitives::AccountId;

use crate::rpc_call::RpcCall;

/// `update_expiry(hashes, new_expiry_ms, account)` — signed, bulk result.
pub struct ExpireCall {
    pub account: AccountId,
    pub hashes: Vec<String>,
    pub expiry_ms: i64,
    pub subkey: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default)]
pub struct ExpireAck {
    pub updated: Vec<String>,
    pub expiry_ms: i64,
}

impl RpcCall for ExpireCall {
    type Output = HashMap<String, ExpireAck>;

    fn method(&self) -> &'static str {
        "expire"
    }

    fn params(&self, signer: &dyn Signer, _clock_offset_ms: i64, testnet: bool) -> Value {
        let message = CanonicalMessage::Expire {
            expiry_ms: self.expiry_ms,
            hashes: &self.hashes,
        };
        let signature = signer.sign(&message.to_bytes());
        let mut params = serde_json::json!({
            "pubkey": self.account.wire_pubkey(testnet),
            "messages": self.hashes,
            "expiry": self.expiry_ms,
            "pubkey_ed25519": hex::encode(signer.ed25519_public()),
            "signature": signature.to_hex(),
        });
        if let Some(subkey) = &self.subkey {
            params["subkey"] = Value::String(hex::encode(subkey));
        }
        params
    }

    fn parse_response(&self, body: Option<Bytes>) -> SnrrResult<Self::Output> {
        let body = body.ok_or_else(|| SnrrError::Transport(TransportError::InvalidJson("empty expire response".into())))?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| SnrrError::Transport(TransportError::InvalidJson(e.to_string())))?;

        let mut out = HashMap::new();
        if let Some(swarm) = value.get("swarm").and_then(Value::as_object) {
            for (snode_pk, entry) in swarm {
                let updated = entry
                    .get("updated")
                    .and_then(Value::as_array)
                    .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                    .unwrap_or_default();
                let expiry_ms = entry.get("expiry").and_then(Value::as_i64).unwrap_or(self.expiry_ms);
                out.insert(snode_pk.clone(), ExpireAck { updated, expiry_ms });
            }
        }
        Ok(out)
    }

    fn account(&self) -> Option<&AccountId> {
        Some(&self.account)
    }
}
