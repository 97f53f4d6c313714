use std::fmt;
use std::net::IpAddr;

/// A single service node: an endpoint in the decentralized storage network.
///
/// Identity is the ed25519 key; equality and hashing use all four fields
/// because the pool stores distinct endpoints (an operator may rotate IPs
/// while keeping keys, or vice versa during a migration window) and callers
/// need to tell those apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Snode {
    pub ip: IpAddr,
    pub port: u16,
    pub ed25519_pubkey: [u8; 32],
    pub x25519_pubkey: [u8; 32],
}

impl Snode {
    pub fn new(ip: IpAddr, port: u16, ed25519_pubkey: [u8; 32], x25519_pubkey: [u8; 32]) -> Self {
        Self {
            ip,
            port,
            ed25519_pubkey,
            x25519_pubkey,
        }
    }

    /// Hex-encoded ed25519 public key, the canonical wire identity for a snode.
    pub fn ed25519_hex(&self) -> String {
        hex::encode(self.ed25519_pubkey)
    }

    /// Hex-encoded x25519 public key, used to derive onion-layer encryption keys.
    pub fn x25519_hex(&self) -> String {
        hex::encode(self.x25519_pubkey)
    }

    pub fn base_url(&self, scheme: &str) -> String {
        format!("{scheme}://{}:{}", self.ip, self.port)
    }
}

impl fmt::Display for Snode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.ed25519_hex();
        write!(f, "{}..{}@{}:{}", &key[..6], &key[key.len() - 6..], self.ip, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snode(port: u16, key_byte: u8) -> Snode {
        Snode::new(
            "127.0.0.1".parse().unwrap(),
            port,
            [key_byte; 32],
            [key_byte; 32],
        )
    }

    #[test]
    fn equality_considers_all_four_fields() {
        let a = snode(1000, 1);
        let b = snode(1000, 1);
        let c = snode(1001, 1);
        let d = snode(1000, 2);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn display_truncates_the_key() {
        let s = snode(4433, 0xab);
        let rendered = s.to_string();
        assert!(rendered.contains("127.0.0.1:4433"));
        assert!(rendered.contains(".."));
    }
}
