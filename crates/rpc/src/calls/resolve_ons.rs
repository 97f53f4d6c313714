use bytes::Bytes;
use serde_json::Value;
use snrr_crypto::{hash_ons_name, Signer};
use snrr_errors::{ProtocolError, SnrrError, SnrrResult, TransportError};

use crate::rpc_call::RpcCall;

/// `oxend_request.ons_resolve(name)` — unauthenticated; the driver issues
/// this against three distinct snodes and only accepts the name if all
/// three return the same encrypted mapping (spec §4.6: cryptographic
/// consistency, not majority vote). The mapping is still sealed at this
/// point — [`crate::SnrrClient::resolve_ons`] decrypts it once agreement is
/// established.
pub struct OnsResolveCall {
    pub hashed_name: String,
}

impl OnsResolveCall {
    pub fn for_name(name: &str) -> Self {
        Self { hashed_name: hash_ons_name(name) }
    }
}

impl RpcCall for OnsResolveCall {
    type Output = String;

    fn method(&self) -> &'static str {
        "oxend_request"
    }

    fn params(&self, _signer: &dyn Signer, _clock_offset_ms: i64, _testnet: bool) -> Value {
        serde_json::json!({
            "endpoint": "ons_resolve",
            "params": { "type": 0, "name_hash": self.hashed_name },
        })
    }

    fn parse_response(&self, body: Option<Bytes>) -> SnrrResult<Self::Output> {
        let body = body.ok_or_else(|| SnrrError::Transport(TransportError::InvalidJson("empty ons_resolve response".into())))?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| SnrrError::Transport(TransportError::InvalidJson(e.to_string())))?;
        value
            .pointer("/result/encrypted_value")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SnrrError::Protocol(ProtocolError::Generic("ons_resolve response missing encrypted_value".into())))
    }
}

/// Accept the resolution only if all three encrypted mappings agree.
pub fn require_consistent(results: &[String]) -> SnrrResult<String> {
    match results {
        [first, rest @ ..] if rest.iter().all(|r| r == first) => Ok(first.clone()),
        _ => Err(SnrrError::Protocol(ProtocolError::InconsistentSnodePools)),
    }
}
