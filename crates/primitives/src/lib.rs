//! Core data model for the Service-Node Request Router.
//!
//! This crate holds the types shared across every other `snrr-*` crate:
//! service-node identity, account/namespace addressing, and the small
//! value types that travel through the RPC surface. It has no knowledge
//! of transport, persistence, or signing — those live in their own crates
//! and depend on this one.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod account;
mod message;
mod namespace;
mod snode;
pub mod wire;

pub use account::AccountId;
pub use message::{LastHashKey, ReceivedMessage};
pub use namespace::Namespace;
pub use snode::Snode;
pub use wire::{decode_snode_list, SnodeWire};

/// Minimum size a snode pool must reach before it is considered ready.
pub const MIN_POOL: usize = 12;

/// Minimum size a bootstrap response must reach (agreed by >= 3 peers) to be adopted.
pub const MIN_BOOTSTRAP: usize = 24;

/// Minimum size a swarm must reach to be considered valid.
pub const MIN_SWARM: usize = 3;

/// Maximum number of snodes the pool keeps after a successful refresh.
pub const MAX_POOL: usize = 256;

/// Mandatory pool refresh interval.
pub const POOL_REFRESH_INTERVAL_SECS: u64 = 2 * 60 * 60;
