//! Typed HTTP engine (component C1).
//!
//! Every overlay transport (`snrr-transport`) ends up POSTing or GETting
//! bytes to some endpoint; this crate is the one place that actually talks
//! to `reqwest`, enforces timeouts and cancellation, and enforces the
//! maximum response size. It never retries — retry policy belongs to the
//! RPC driver (`snrr-rpc`), which knows which errors are worth retrying.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod engine;
mod json;

pub use engine::{HttpEngine, HttpResponse, ReqwestEngine};
pub use json::{decode_json, send_json};
