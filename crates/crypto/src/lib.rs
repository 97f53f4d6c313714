//! Ed25519 request signing and response validation.
//!
//! This crate owns the cryptographic primitives used by `snrr-rpc`: it knows
//! how to sign the canonical strings required by each authenticated
//! endpoint and how to validate the signatures snodes attach to their
//! responses. It does not know about HTTP, transports, or the RPC surface
//! itself.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod canonical;
mod ons;
mod signer;
mod validate;

pub use canonical::CanonicalMessage;
pub use ons::{decrypt_ons_value, hash_ons_name};
pub use signer::{Ed25519Signer, Signature, Signer};
pub use validate::ResponseValidator;
