use data_encoding::{Encoding, Specification};
use std::sync::OnceLock;

/// z-base-32, the alphabet Lokinet uses for `.loki`/`.snode` addresses:
/// friendlier to read aloud and to select with a mouse than standard
/// base32 (no padding, avoids visually similar characters).
fn base32z() -> &'static Encoding {
    static ENCODING: OnceLock<Encoding> = OnceLock::new();
    ENCODING.get_or_init(|| {
        let mut spec = Specification::new();
        spec.symbols.push_str("ybndrfg8ejkmcpqxot1uwisza345h769");
        spec.encoding().expect("fixed base32z specification is valid")
    })
}

/// Derive a snode's `.snode` hostname from its ed25519 public key.
pub fn snode_hostname(ed25519_pubkey: &[u8; 32]) -> String {
    format!("{}.snode", base32z().encode(ed25519_pubkey).to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hostname_is_deterministic_and_lowercase() {
        let key = [0xab; 32];
        let a = snode_hostname(&key);
        let b = snode_hostname(&key);
        assert_eq!(a, b);
        assert_eq!(a, a.to_ascii_lowercase());
        assert!(a.ends_with(".snode"));
    }

    #[test]
    fn different_keys_give_different_hostnames() {
        assert_ne!(snode_hostname(&[1u8; 32]), snode_hostname(&[2u8; 32]));
    }
}
