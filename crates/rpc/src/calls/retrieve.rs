use bytes::Bytes;
use serde_json::Value;
use snrr_crypto::{CanonicalMessage, Signer};
use snrr_errors::{ProtocolError, SnrrError, SnrrResult};
use snrr_primitives::{AccountId, Namespace, ReceivedMessage};

use crate::rpc_call::{local_now_ms, RpcCall};

/// Messages returned by a single namespace's retrieve, plus the server hash
/// to resume from next time (spec §4.9 `last_hash` cursor).
#[derive(Debug, Clone)]
pub struct RetrieveResult {
    pub messages: Vec<ReceivedMessage>,
    pub last_hash: Option<String>,
}

/// `retrieve(namespace, account, last_hash)` — signed whenever the
/// namespace is non-default (spec §4.5/§4.6).
pub struct RetrieveCall {
    pub account: AccountId,
    pub namespace: Namespace,
    pub last_hash: Option<String>,
    pub subkey: Option<Vec<u8>>,
}

pub fn build_params(
    account: &AccountId,
    namespace: Namespace,
    last_hash: &Option<String>,
    subkey: &Option<Vec<u8>>,
    signer: &dyn Signer,
    clock_offset_ms: i64,
    testnet: bool,
) -> Value {
    let mut params = serde_json::json!({
        "pubkey": account.wire_pubkey(testnet),
        "namespace": namespace.value(),
    });
    if let Some(hash) = last_hash {
        params["last_hash"] = Value::String(hash.clone());
    }
    if namespace.requires_auth() {
        let timestamp_ms = local_now_ms() + clock_offset_ms;
        let message = CanonicalMessage::Retrieve {
            namespace: namespace.value(),
            timestamp_ms,
        };
        let signature = signer.sign(&message.to_bytes());
        params["timestamp"] = Value::from(timestamp_ms);
        params["pubkey_ed25519"] = Value::String(hex::encode(signer.ed25519_public()));
        params["signature"] = Value::String(signature.to_hex());
        if let Some(subkey) = subkey {
            params["subkey"] = Value::String(hex::encode(subkey));
        }
    }
    params
}

pub fn parse_retrieve_body(body: Option<Bytes>) -> SnrrResult<RetrieveResult> {
    let body = body.ok_or_else(|| protocol_generic("retrieve response carried no body"))?;
    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| SnrrError::Transport(snrr_errors::TransportError::InvalidJson(e.to_string())))?;

    let messages = value
        .get("messages")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(decode_message).collect::<Vec<_>>())
        .unwrap_or_default();

    let last_hash = messages_last_hash(&messages);

    Ok(RetrieveResult { messages, last_hash })
}

fn messages_last_hash(messages: &[ReceivedMessage]) -> Option<String> {
    messages.last().map(|m| m.hash.clone())
}

fn decode_message(entry: &Value) -> Option<ReceivedMessage> {
    let hash = entry.get("hash")?.as_str()?.to_string();
    let data = entry.get("data")?.as_str()?;
    let ciphertext = data_encoding::BASE64.decode(data.as_bytes()).ok()?;
    let timestamp_ms = entry.get("timestamp").and_then(Value::as_i64).unwrap_or(0);
    let expiration_ms = entry.get("expiration").and_then(Value::as_i64).unwrap_or(0);
    Some(ReceivedMessage {
        hash,
        ciphertext,
        timestamp_ms,
        expiration_ms,
        namespace: Namespace::DEFAULT,
    })
}

fn protocol_generic(message: impl Into<String>) -> SnrrError {
    SnrrError::Protocol(ProtocolError::Generic(message.into()))
}

impl RpcCall for RetrieveCall {
    type Output = RetrieveResult;

    fn method(&self) -> &'static str {
        "retrieve"
    }

    fn params(&self, signer: &dyn Signer, clock_offset_ms: i64, testnet: bool) -> Value {
        build_params(
            &self.account,
            self.namespace,
            &self.last_hash,
            &self.subkey,
            signer,
            clock_offset_ms,
            testnet,
        )
    }

    fn parse_response(&self, body: Option<Bytes>) -> SnrrResult<Self::Output> {
        parse_retrieve_body(body)
    }

    fn account(&self) -> Option<&AccountId> {
        Some(&self.account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_messages_and_tracks_last_hash() {
        let body = serde_json::json!({
            "messages": [
                {"hash": "h1", "data": data_encoding::BASE64.encode(b"one"), "timestamp": 1, "expiration": 2},
                {"hash": "h2", "data": data_encoding::BASE64.encode(b"two"), "timestamp": 3, "expiration": 4},
            ]
        });
        let bytes = Bytes::from(serde_json::to_vec(&body).unwrap());
        let result = parse_retrieve_body(Some(bytes)).unwrap();
        assert_eq!(result.messages.len(), 2);
        assert_eq!(result.last_hash, Some("h2".to_string()));
    }

    #[test]
    fn missing_messages_array_yields_empty_result() {
        let body = Bytes::from(serde_json::to_vec(&serde_json::json!({})).unwrap());
        let result = parse_retrieve_body(Some(body)).unwrap();
        assert!(result.messages.is_empty());
        assert_eq!(result.last_hash, None);
    }
}
