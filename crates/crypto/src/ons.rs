use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use blake2::{Blake2b512, Digest};
use snrr_errors::CryptoError;

const NONCE_LEN: usize = 12;

/// Hash a lowercased Session name for ONS resolution: BLAKE2b-512, then
/// base64-encoded for transport.
pub fn hash_ons_name(name: &str) -> String {
    data_encoding::BASE64.encode(&name_digest(name))
}

fn name_digest(name: &str) -> [u8; 64] {
    let lowered = name.to_ascii_lowercase();
    let mut hasher = Blake2b512::new();
    hasher.update(lowered.as_bytes());
    let mut out = [0u8; 64];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// The AES-256-GCM key an ONS mapping's session id is encrypted under: the
/// first 32 bytes of the same BLAKE2b-512 digest used for the name-hash
/// lookup, so resolving a name never requires a round trip beyond the hash
/// itself.
fn derive_decryption_key(name: &str) -> [u8; 32] {
    let mut key = [0u8; 32];
    key.copy_from_slice(&name_digest(name)[..32]);
    key
}

/// Decrypt a snode's `encrypted_value` for a resolved ONS mapping, returning
/// the hex-encoded session id. The blob is `nonce (12 bytes) ||
/// AES-256-GCM(ciphertext || tag)`, base64-encoded.
pub fn decrypt_ons_value(name: &str, ciphertext_b64: &str) -> Result<String, CryptoError> {
    let blob = data_encoding::BASE64
        .decode(ciphertext_b64.as_bytes())
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;
    if blob.len() <= NONCE_LEN {
        return Err(CryptoError::DecryptionFailed("encrypted_value too short for a nonce".into()));
    }
    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);

    let key = derive_decryption_key(name);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed(format!("ons decrypt failed for name hash of {name}")))?;

    Ok(hex::encode(plaintext))
}

#[cfg(test)]
mod tests {
    use rand::rngs::OsRng;
    use rand::RngCore;

    use super::*;

    fn seal(name: &str, plaintext: &[u8]) -> String {
        let key = derive_decryption_key(name);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let mut ciphertext = cipher.encrypt(nonce, plaintext).unwrap();
        let mut blob = nonce_bytes.to_vec();
        blob.append(&mut ciphertext);
        data_encoding::BASE64.encode(&blob)
    }

    #[test]
    fn hashing_is_case_insensitive() {
        assert_eq!(hash_ons_name("Alice"), hash_ons_name("alice"));
    }

    #[test]
    fn different_names_hash_differently() {
        assert_ne!(hash_ons_name("alice"), hash_ons_name("bob"));
    }

    #[test]
    fn decrypts_value_sealed_under_the_matching_name() {
        let session_id = hex::decode("05aabbccddeeff00112233445566778899aabbccddeeff00112233445566778899").unwrap();
        let blob = seal("alice", &session_id);
        let decoded = decrypt_ons_value("alice", &blob).unwrap();
        assert_eq!(decoded, hex::encode(&session_id));
    }

    #[test]
    fn rejects_a_value_sealed_under_a_different_name() {
        let blob = seal("alice", b"not a session id");
        assert!(decrypt_ons_value("bob", &blob).is_err());
    }

    #[test]
    fn rejects_a_blob_too_short_to_contain_a_nonce() {
        let short = data_encoding::BASE64.encode(b"short");
        assert!(matches!(decrypt_ons_value("alice", &short), Err(CryptoError::DecryptionFailed(_))));
    }
}
