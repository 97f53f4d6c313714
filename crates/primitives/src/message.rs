use crate::{AccountId, Namespace};

/// A single message returned by a `retrieve` call.
///
/// `hash` is opaque (server-assigned); uniqueness is enforced per
/// `(account, namespace, snode)` by callers that deduplicate while polling
/// multiple snodes for the same swarm.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReceivedMessage {
    pub hash: String,
    #[serde(with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
    pub timestamp_ms: i64,
    pub expiration_ms: i64,
    pub namespace: Namespace,
}

/// Cursor used to request only messages newer than the last one seen, keyed
/// by the triple that makes it unique: which account, which namespace, and
/// which snode served it (different snodes in a swarm may be at slightly
/// different points in their own retention window).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LastHashKey {
    pub account: AccountId,
    pub namespace: Namespace,
    pub snode_ed25519_hex: String,
}

impl LastHashKey {
    pub fn new(account: AccountId, namespace: Namespace, snode_ed25519_hex: impl Into<String>) -> Self {
        Self {
            account,
            namespace,
            snode_ed25519_hex: snode_ed25519_hex.into(),
        }
    }

    pub fn storage_key(&self) -> String {
        format!(
            "last_hash:{}:{}:{}",
            self.account, self.namespace, self.snode_ed25519_hex
        )
    }
}

mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        data_encoding::BASE64.encode(bytes).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        data_encoding::BASE64
            .decode(s.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_is_stable() {
        let key = LastHashKey::new(AccountId::from_hex("05aa"), Namespace::new(-10), "deadbeef");
        assert_eq!(key.storage_key(), "last_hash:05aa:-10:deadbeef");
    }

    #[test]
    fn roundtrips_through_json() {
        let msg = ReceivedMessage {
            hash: "h1".into(),
            ciphertext: vec![1, 2, 3],
            timestamp_ms: 100,
            expiration_ms: 200,
            namespace: Namespace::DEFAULT,
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: ReceivedMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }
}
