use std::net::IpAddr;
use std::str::FromStr;

use serde::Deserialize;

use crate::Snode;

/// The on-wire shape of a snode as returned by `get_n_service_nodes`,
/// `get_swarm`, and the `snodes` array on a 421 response. Field names vary
/// slightly by endpoint (`public_ip`/`ip`, `storage_port`/`port`); both are
/// accepted via `#[serde(alias)]` rather than two separate structs, the
/// same tolerant-parsing shape the swarm resolver uses for its own
/// legacy/current field names.
#[derive(Debug, Deserialize)]
pub struct SnodeWire {
    #[serde(alias = "public_ip")]
    ip: String,
    #[serde(alias = "storage_port")]
    port: u16,
    pubkey_ed25519: String,
    pubkey_x25519: String,
}

impl SnodeWire {
    /// Decode into a [`Snode`]. Malformed entries (bad IP, bad hex, wrong
    /// key length) are skipped by the caller rather than failing the whole
    /// batch — bootstrap and swarm responses are decoded tolerantly per
    /// spec.
    pub fn into_snode(self) -> Option<Snode> {
        let ip = IpAddr::from_str(&self.ip).ok()?;
        let ed25519_pubkey = decode_key(&self.pubkey_ed25519)?;
        let x25519_pubkey = decode_key(&self.pubkey_x25519)?;
        Some(Snode::new(ip, self.port, ed25519_pubkey, x25519_pubkey))
    }
}

fn decode_key(hex_str: &str) -> Option<[u8; 32]> {
    let bytes = hex::decode(hex_str).ok()?;
    bytes.try_into().ok()
}

/// Decode a JSON array of [`SnodeWire`] entries into `Snode`s, silently
/// dropping malformed entries.
pub fn decode_snode_list(value: &serde_json::Value) -> Vec<Snode> {
    let Some(array) = value.as_array() else {
        return Vec::new();
    };
    array
        .iter()
        .filter_map(|entry| serde_json::from_value::<SnodeWire>(entry.clone()).ok())
        .filter_map(SnodeWire::into_snode)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_legacy_and_current_field_names() {
        let current = json!([{
            "ip": "10.0.0.1",
            "port": 4433,
            "pubkey_ed25519": hex::encode([1u8; 32]),
            "pubkey_x25519": hex::encode([2u8; 32]),
        }]);
        let legacy = json!([{
            "public_ip": "10.0.0.2",
            "storage_port": 4433,
            "pubkey_ed25519": hex::encode([3u8; 32]),
            "pubkey_x25519": hex::encode([4u8; 32]),
        }]);

        assert_eq!(decode_snode_list(&current).len(), 1);
        assert_eq!(decode_snode_list(&legacy).len(), 1);
    }

    #[test]
    fn malformed_entries_are_skipped_not_fatal() {
        let mixed = json!([
            {"ip": "not-an-ip", "port": 1, "pubkey_ed25519": "00", "pubkey_x25519": "00"},
            {"ip": "10.0.0.1", "port": 1, "pubkey_ed25519": hex::encode([5u8; 32]), "pubkey_x25519": hex::encode([6u8; 32])},
        ]);
        assert_eq!(decode_snode_list(&mixed).len(), 1);
    }
}
