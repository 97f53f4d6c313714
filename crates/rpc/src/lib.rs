//! Authenticated RPC surface (component C6): retrieve, store, delete,
//! expire, revoke-subkey, delete-all, ONS resolution, swarm lookup, and
//! info — all driven through one generic retry/accounting loop.

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod batch;
mod calls;
mod client;
mod cursor;
mod operations;
mod retry;
mod rpc_call;
mod send_message;

pub use calls::{
    DeleteAllCall, DeleteCall, ExpireAck, ExpireCall, GetInfoCall, OnsResolveCall, RetrieveCall, RetrieveResult,
    RevokeSubkeyCall, StoreAck, StoreCall,
};
pub use client::SnrrClient;
pub use retry::{Backoff, MAX_RETRIES_FETCH, MAX_RETRIES_RPC};
pub use rpc_call::RpcCall;
