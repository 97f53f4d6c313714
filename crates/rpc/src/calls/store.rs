use std::collections::HashMap;

use bytes::Bytes;
use serde_json::Value;
use snrr_crypto::{CanonicalMessage, Signer};
use snrr_errors::{SnrrError, SnrrResult, TransportError};
use snrr_primitives::{AccountId, Namespace};

use crate::rpc_call::{local_now_ms, RpcCall};

/// One snode's signed acknowledgement of a store (spec §6: `store` returns
/// `{ swarm: { snode_pk -> { hash, signature, ... } } }`).
#[derive(Debug, Clone)]
pub struct StoreAck {
    pub hash: String,
    pub signature: String,
}

/// `store(data, ttl, namespace, account)` — always signed; the default
/// namespace is still authenticated for writes (only reads are public).
pub struct StoreCall {
    pub account: AccountId,
    pub namespace: Namespace,
    pub data: Vec<u8>,
    pub ttl_ms: i64,
}

impl RpcCall for StoreCall {
    type Output = HashMap<String, StoreAck>;

    fn method(&self) -> &'static str {
        "store"
    }

    fn params(&self, signer: &dyn Signer, clock_offset_ms: i64, testnet: bool) -> Value {
        let timestamp_ms = local_now_ms() + clock_offset_ms;
        let message = CanonicalMessage::Store {
            namespace: self.namespace.value(),
            timestamp_ms,
        };
        let signature = signer.sign(&message.to_bytes());

        let mut params = serde_json::json!({
            "pubkey": self.account.wire_pubkey(testnet),
            "data": data_encoding::BASE64.encode(&self.data),
            "ttl": self.ttl_ms,
            "timestamp": timestamp_ms,
            "pubkey_ed25519": hex::encode(signer.ed25519_public()),
            "signature": signature.to_hex(),
        });
        if self.namespace != Namespace::DEFAULT {
            params["namespace"] = Value::from(self.namespace.value());
        }
        params
    }

    fn parse_response(&self, body: Option<Bytes>) -> SnrrResult<Self::Output> {
        let body = body.ok_or_else(|| SnrrError::Transport(TransportError::InvalidJson("empty store response".into())))?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| SnrrError::Transport(TransportError::InvalidJson(e.to_string())))?;

        let swarm = value.get("swarm").and_then(Value::as_object);
        let mut out = HashMap::new();
        if let Some(swarm) = swarm {
            for (snode_pk, entry) in swarm {
                let hash = entry.get("hash").and_then(Value::as_str).unwrap_or_default().to_string();
                let signature = entry.get("signature").and_then(Value::as_str).unwrap_or_default().to_string();
                out.insert(snode_pk.clone(), StoreAck { hash, signature });
            }
        }
        Ok(out)
    }

    fn account(&self) -> Option<&AccountId> {
        Some(&self.account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_per_snode_acks() {
        let body = serde_json::json!({
            "swarm": {
                "abcd": {"hash": "h1", "signature": "sig1"},
            }
        });
        let call = StoreCall {
            account: AccountId::from_hex("05aa"),
            namespace: Namespace::DEFAULT,
            data: vec![1, 2, 3],
            ttl_ms: 1000,
        };
        let result = call.parse_response(Some(Bytes::from(serde_json::to_vec(&body).unwrap()))).unwrap();
        assert_eq!(result.get("abcd").unwrap().hash, "h1");
    }
}
