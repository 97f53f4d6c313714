use std::fmt;

/// A user's long-term x25519 identity, hex-encoded with a one-byte network
/// prefix on the wire. The swarm responsible for an account's storage is a
/// (remote) function of this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Build from a hex string as received from the application layer
    /// (already prefixed, e.g. `05aabb...`).
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into().to_ascii_lowercase())
    }

    /// The full hex id, prefix included.
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// The hex id with the one-byte network prefix stripped, as required on
    /// testnet wire payloads.
    pub fn stripped_prefix(&self) -> &str {
        if self.0.len() > 2 {
            &self.0[2..]
        } else {
            &self.0
        }
    }

    /// Select the wire form for the given network.
    pub fn wire_pubkey(&self, testnet: bool) -> &str {
        if testnet {
            self.stripped_prefix()
        } else {
            self.as_hex()
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_one_byte_prefix() {
        let a = AccountId::from_hex("05aabbccdd");
        assert_eq!(a.stripped_prefix(), "aabbccdd");
        assert_eq!(a.wire_pubkey(true), "aabbccdd");
        assert_eq!(a.wire_pubkey(false), "05aabbccdd");
    }

    #[test]
    fn lowercases_input() {
        let a = AccountId::from_hex("05AABB");
        assert_eq!(a.as_hex(), "05aabb");
    }
}
