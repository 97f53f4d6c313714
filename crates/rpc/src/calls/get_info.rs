use bytes::Bytes;
use serde_json::Value;
use snrr_crypto::Signer;
use snrr_errors::{SnrrError, SnrrResult, TransportError};

use crate::rpc_call::RpcCall;

/// `get_info(snode)` — unauthenticated; its only purpose is to surface the
/// server's clock (`t`) and fork counters (`hf`), which the driver's shared
/// accounting step already applies to every response regardless of which
/// call produced it.
#[derive(Default)]
pub struct GetInfoCall;

impl RpcCall for GetInfoCall {
    type Output = i64;

    fn method(&self) -> &'static str {
        "info"
    }

    fn params(&self, _signer: &dyn Signer, _clock_offset_ms: i64, _testnet: bool) -> Value {
        serde_json::json!({})
    }

    fn parse_response(&self, body: Option<Bytes>) -> SnrrResult<Self::Output> {
        let body = body.ok_or_else(|| SnrrError::Transport(TransportError::InvalidJson("empty get_info response".into())))?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| SnrrError::Transport(TransportError::InvalidJson(e.to_string())))?;
        value
            .get("t")
            .and_then(Value::as_i64)
            .ok_or_else(|| SnrrError::Transport(TransportError::InvalidJson("get_info response missing t".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_server_timestamp() {
        let call = GetInfoCall;
        let body = Bytes::from(serde_json::to_vec(&serde_json::json!({"t": 1234})).unwrap());
        assert_eq!(call.parse_response(Some(body)).unwrap(), 1234);
    }
}
