use ed25519_dalek::ed25519::signature::Signer as _;
use ed25519_dalek::{SigningKey, VerifyingKey};
use snrr_errors::CryptoError;
use x25519_dalek::{PublicKey as X25519Public, StaticSecret as X25519Secret};

/// A raw ed25519 signature, kept as a newtype so call sites don't have to
/// remember the byte length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

/// Abstracts over the key material needed to sign and authenticate requests.
///
/// This generalizes the "identity owns the signing key, the trait exposes
/// the public surface" shape used for peer identity elsewhere in this
/// codebase, from secp256k1/account-address signing to the ed25519/x25519
/// pair this protocol requires.
pub trait Signer: Send + Sync {
    /// The long-term ed25519 public key used to authenticate requests and
    /// verify snode responses.
    fn ed25519_public(&self) -> [u8; 32];

    /// The x25519 public key derived from the same key material, sent as
    /// `pubkey` on authenticated requests.
    fn x25519_public(&self) -> [u8; 32];

    /// Sign a message with the ed25519 private key.
    fn sign(&self, message: &[u8]) -> Signature;
}

/// The standard [`Signer`] implementation: owns an ed25519 signing key and
/// derives a matching x25519 key pair from the same seed.
#[derive(Clone)]
pub struct Ed25519Signer {
    signing_key: SigningKey,
    x25519_secret: X25519Secret,
}

impl Ed25519Signer {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        let x25519_secret = X25519Secret::from(ed25519_to_x25519_seed(&signing_key));
        Self {
            signing_key,
            x25519_secret,
        }
    }

    /// Generate a fresh random identity, for tests and ephemeral clients.
    pub fn random() -> Self {
        use rand_core::{OsRng, RngCore};
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Self::from_seed(seed)
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }
}

impl Signer for Ed25519Signer {
    fn ed25519_public(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    fn x25519_public(&self) -> [u8; 32] {
        X25519Public::from(&self.x25519_secret).to_bytes()
    }

    fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }
}

/// Derive an x25519 scalar seed from an ed25519 signing key's seed bytes.
///
/// This mirrors the standard "clamp the hash of the ed25519 seed" technique
/// used to obtain a matching Curve25519 key pair without shipping two
/// independent secrets.
fn ed25519_to_x25519_seed(signing_key: &SigningKey) -> [u8; 32] {
    use blake2::{Blake2b512, Digest};
    let mut hasher = Blake2b512::new();
    hasher.update(signing_key.to_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..32]);
    out
}

/// Verify a detached ed25519 signature against a public key, used to check
/// signatures snodes attach to their responses.
pub fn verify(public_key: &[u8; 32], message: &[u8], signature: &[u8; 64]) -> Result<(), CryptoError> {
    let verifying_key = VerifyingKey::from_bytes(public_key)
        .map_err(|e| CryptoError::ValidationFailed(e.to_string()))?;
    let sig = ed25519_dalek::Signature::from_bytes(signature);
    verifying_key
        .verify_strict(message, &sig)
        .map_err(|e| CryptoError::ValidationFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trips() {
        let signer = Ed25519Signer::random();
        let msg = b"retrieve0123456789";
        let sig = signer.sign(msg);
        let pubkey = signer.ed25519_public();
        assert!(verify(&pubkey, msg, sig.as_bytes()).is_ok());
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let signer = Ed25519Signer::random();
        let sig = signer.sign(b"store01000");
        let pubkey = signer.ed25519_public();
        assert!(verify(&pubkey, b"store01001", sig.as_bytes()).is_err());
    }

    #[test]
    fn same_seed_produces_same_keys() {
        let seed = [7u8; 32];
        let a = Ed25519Signer::from_seed(seed);
        let b = Ed25519Signer::from_seed(seed);
        assert_eq!(a.ed25519_public(), b.ed25519_public());
        assert_eq!(a.x25519_public(), b.x25519_public());
    }
}
