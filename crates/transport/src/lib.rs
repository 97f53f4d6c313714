//! Overlay transports (component C2).
//!
//! Four interchangeable ways to deliver a byte payload to a destination:
//! layered onion routing, a local Lokinet tunnel context, a router-level
//! (native) Lokinet tunnel, and plain direct HTTP(S). Each implements the
//! same [`Transport`] contract so the dispatcher (`snrr-dispatch`) can treat
//! them uniformly.
//!
//! The symmetric wire cryptography of the onion layer itself is out of
//! scope (spec §1): [`onion::SymmetricLayerCodec`] is the seam where a real
//! implementation plugs in layered encryption; this crate models the
//! *shape* of onion routing (path selection, lazy build, teardown on hop
//! failure) around that opaque collaborator.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod destination;
mod direct;
mod layer;
mod lokinet;
mod native_lokinet;
mod onion;
mod transport_trait;

pub mod mock;

pub use destination::Destination;
pub use direct::DirectTransport;
pub use layer::{Layer, LayerSet};
pub use lokinet::{LokinetContext, LokinetContextStatus, LokinetTransport};
pub use native_lokinet::NativeLokinetTransport;
pub use onion::{OnionTransport, SymmetricLayerCodec};
pub use transport_trait::{Transport, TransportInfo};
