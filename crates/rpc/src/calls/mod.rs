mod delete;
mod delete_all;
mod expire;
mod get_info;
mod resolve_ons;
mod retrieve;
mod revoke_subkey;
mod store;

pub use delete::DeleteCall;
pub use delete_all::DeleteAllCall;
pub use expire::{ExpireAck, ExpireCall};
pub use get_info::GetInfoCall;
pub use resolve_ons::{require_consistent, OnsResolveCall};
pub use retrieve::{build_params as build_retrieve_params, parse_retrieve_body, RetrieveCall, RetrieveResult};
pub use revoke_subkey::RevokeSubkeyCall;
pub use store::{StoreAck, StoreCall};
