//! Shared error taxonomy for the Service-Node Request Router.
//!
//! Every `snrr-*` crate that can fail returns `SnrrError`. The four error
//! groups mirror the ones named in the router's design: transport-level
//! failures, raw HTTP status codes (fed to the failure accountant), signing/
//! validation failures, and protocol-level inconsistencies.

use bytes::Bytes;

/// Transport-level failures, produced before a response's HTTP status is
/// known to be meaningful (or for overlays that hide the real status code).
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("request cancelled")]
    Cancelled,
    #[error("transport not ready")]
    NotReady,
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid json: {0}")]
    InvalidJson(String),
    #[error("response exceeded max file size")]
    MaxFileSizeExceeded,
    /// Connection-level failure (DNS, refused, reset) below the HTTP layer.
    /// Not one of the named kinds in the router's design note, but a real
    /// client needs somewhere to put it; treated as retryable like other
    /// transport failures.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
}

/// Cryptographic failures: key material, signing, decryption, hashing, or
/// signature/validation mismatches.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CryptoError {
    #[error("no key pair available")]
    NoKeyPair,
    #[error("signing failed: {0}")]
    SigningFailed(String),
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
    #[error("hashing failed: {0}")]
    HashingFailed(String),
    #[error("response validation failed: {0}")]
    ValidationFailed(String),
}

/// Protocol-level inconsistencies that are not attributable to a single
/// transport call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProtocolError {
    #[error("insufficient snodes: need {needed}, have {have}")]
    InsufficientSnodes { needed: usize, have: usize },
    #[error("inconsistent snode pools: peers disagreed on the result")]
    InconsistentSnodePools,
    #[error("local clock is out of sync with the network")]
    ClockOutOfSync,
    #[error("snode pool update failed: {0}")]
    SnodePoolUpdatingFailed(String),
    #[error("{0}")]
    Generic(String),
}

/// The top-level error returned by every `snrr-*` operation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SnrrError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A non-2xx HTTP status with its raw body, fed to the failure
    /// accountant so it can apply status-specific rules (§4.8).
    #[error("http status {code}")]
    HttpStatus { code: u16, body: Bytes },

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl SnrrError {
    pub fn http_status(code: u16, body: impl Into<Bytes>) -> Self {
        Self::HttpStatus {
            code,
            body: body.into(),
        }
    }

    /// The HTTP status code this error carries, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the RPC driver should retry this error against another
    /// snode. `Cancelled` and `InvalidUrl` are deliberately excluded even
    /// though they are `TransportError`s: cancellation means the caller no
    /// longer wants the result, and an invalid URL will not become valid on
    /// retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(TransportError::Cancelled | TransportError::InvalidUrl(_)) => false,
            Self::Transport(_) => true,
            Self::HttpStatus { code, .. } => matches!(code, 404 | 500 | 502 | 503),
            Self::Crypto(CryptoError::ValidationFailed(_)) => false,
            Self::Crypto(_) => false,
            Self::Protocol(ProtocolError::ClockOutOfSync) => false,
            Self::Protocol(_) => false,
        }
    }
}

pub type SnrrResult<T> = Result<T, SnrrError>;
