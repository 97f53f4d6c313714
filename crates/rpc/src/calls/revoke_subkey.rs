use bytes::Bytes;
use serde_json::Value;
use snrr_crypto::{CanonicalMessage, Signer};
use snrr_errors::SnrrResult;
use snrr_primitives::AccountId;

use crate::rpc_call::RpcCall;

/// `revoke_subkey(subkey, account)` — signed, unit result (spec §4.6).
pub struct RevokeSubkeyCall {
    pub account: AccountId,
    pub subkey: Vec<u8>,
}

impl RpcCall for RevokeSubkeyCall {
    type Output = ();

    fn method(&self) -> &'static str {
        "revoke_subkey"
    }

    fn params(&self, signer: &dyn Signer, _clock_offset_ms: i64, testnet: bool) -> Value {
        let message = CanonicalMessage::RevokeSubkey { subkey: &self.subkey };
        let signature = signer.sign(&message.to_bytes());
        serde_json::json!({
            "pubkey": self.account.wire_pubkey(testnet),
            "revoke_subkey": hex::encode(&self.subkey),
            "pubkey_ed25519": hex::encode(signer.ed25519_public()),
            "signature": signature.to_hex(),
        })
    }

    fn parse_response(&self, _body: Option<Bytes>) -> SnrrResult<Self::Output> {
        Ok(())
    }

    fn account(&self) -> Option<&AccountId> {
        Some(&self.account)
    }
}
