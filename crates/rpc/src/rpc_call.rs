use bytes::Bytes;
use serde_json::Value;
use snrr_crypto::Signer;
use snrr_errors::SnrrResult;
use snrr_primitives::AccountId;

/// One RPC operation's wire shape and response parsing, driving
/// [`crate::client::SnrrClient::call`]'s shared retry/accounting loop
/// (spec §4.6: "one function per endpoint", generalized into one driver
/// plus many typed calls rather than eight copies of the retry loop).
pub trait RpcCall: Send + Sync {
    type Output;

    /// The JSON-RPC method name sent as `{"method": ..., "params": ...}`.
    fn method(&self) -> &'static str;

    /// Build the (possibly signed) `params` object. Authenticated calls
    /// sign a canonical message with `signer` and stamp
    /// `local_now_ms + clock_offset_ms` as `timestamp`; unauthenticated
    /// calls (default-namespace retrieve, `get_info`) ignore both.
    fn params(&self, signer: &dyn Signer, clock_offset_ms: i64, testnet: bool) -> Value;

    /// Decode a successful response body into this call's output type.
    fn parse_response(&self, body: Option<Bytes>) -> SnrrResult<Self::Output>;

    /// The account this call is scoped to, if any — used by the driver to
    /// route 421 swarm-replacement/invalidation outcomes. `None` for calls
    /// that address a specific snode rather than an account (`get_info`).
    fn account(&self) -> Option<&AccountId> {
        None
    }
}

pub(crate) fn local_now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
