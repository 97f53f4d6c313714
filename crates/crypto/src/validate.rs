use std::collections::HashMap;

use snrr_errors::CryptoError;

use crate::signer::verify;

/// A single signed entry to validate: the snode's identity (used as the map
/// key), the canonical message it should have signed, and the signature it
/// attached.
pub struct SignedEntry {
    pub snode_ed25519: [u8; 32],
    pub snode_x25519_hex: String,
    pub message: Vec<u8>,
    pub signature: [u8; 64],
}

/// Validates signatures snodes attach to their responses.
///
/// Singular endpoints (one expected signer) raise on any mismatch; bulk
/// endpoints (`delete`, `delete_all`, `delete_all_before`) validate each
/// entry independently and report a per-snode map instead, since a single
/// misbehaving or stale snode should not fail the whole call.
pub struct ResponseValidator;

impl ResponseValidator {
    /// Validate a single signed response, raising on cryptographic
    /// inconsistency rather than returning a boolean — callers that expect
    /// exactly one signer (store, retrieve, expire, revoke_subkey) have no
    /// useful fallback if it's wrong.
    pub fn validate_single(entry: &SignedEntry) -> Result<(), CryptoError> {
        verify(&entry.snode_ed25519, &entry.message, &entry.signature)
    }

    /// Validate every entry independently, returning `{snode_x25519 -> bool}`.
    /// Used by `delete`/`delete_all`/`delete_all_before`, whose responses
    /// are swarm-wide maps where individual snodes may be unreachable,
    /// stale, or (rarely) forging a reply.
    pub fn validate_bulk(entries: &[SignedEntry]) -> HashMap<String, bool> {
        entries
            .iter()
            .map(|entry| {
                let ok = verify(&entry.snode_ed25519, &entry.message, &entry.signature).is_ok();
                (entry.snode_x25519_hex.clone(), ok)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::{Ed25519Signer, Signer};

    fn entry(signer: &Ed25519Signer, message: &[u8], tamper: bool) -> SignedEntry {
        let sig = signer.sign(message);
        SignedEntry {
            snode_ed25519: signer.ed25519_public(),
            snode_x25519_hex: hex::encode(signer.x25519_public()),
            message: if tamper {
                let mut m = message.to_vec();
                m.push(0xff);
                m
            } else {
                message.to_vec()
            },
            signature: *sig.as_bytes(),
        }
    }

    #[test]
    fn single_valid_entry_passes() {
        let signer = Ed25519Signer::random();
        let e = entry(&signer, b"deleteaaa", false);
        assert!(ResponseValidator::validate_single(&e).is_ok());
    }

    #[test]
    fn single_tampered_entry_fails() {
        let signer = Ed25519Signer::random();
        let e = entry(&signer, b"deleteaaa", true);
        assert!(ResponseValidator::validate_single(&e).is_err());
    }

    #[test]
    fn bulk_reports_per_snode_without_raising() {
        let good_signer = Ed25519Signer::random();
        let bad_signer = Ed25519Signer::random();
        let good = entry(&good_signer, b"deleteaaa", false);
        let bad = entry(&bad_signer, b"deleteaaa", true);
        let good_key = good.snode_x25519_hex.clone();
        let bad_key = bad.snode_x25519_hex.clone();

        let result = ResponseValidator::validate_bulk(&[good, bad]);
        assert_eq!(result.get(&good_key), Some(&true));
        assert_eq!(result.get(&bad_key), Some(&false));
    }
}
