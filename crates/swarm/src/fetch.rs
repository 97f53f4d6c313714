use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, Method};
use serde::Deserialize;
use snrr_errors::{ProtocolError, SnrrError, SnrrResult};
use snrr_http::HttpEngine;
use snrr_primitives::{decode_snode_list, AccountId, Snode};
use tokio_util::sync::CancellationToken;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// The `get_swarm` response shape. The array itself carries two possible
/// field names across protocol versions (`snodes` current, `swarm`
/// legacy) — handled with `#[serde(alias)]` rather than two parser
/// branches, same as the per-entry field aliasing in
/// [`snrr_primitives::wire`].
#[derive(Deserialize)]
struct SwarmResponse {
    #[serde(alias = "swarm")]
    snodes: serde_json::Value,
}

/// Call `get_swarm` against `snode` for `account` and parse the result.
pub async fn fetch_swarm(engine: &Arc<dyn HttpEngine>, snode: &Snode, account: &AccountId) -> SnrrResult<HashSet<Snode>> {
    let url = format!("{}/storage_rpc_v1", snode.base_url("https"));
    let body = serde_json::json!({
        "method": "get_swarm",
        "params": { "pubkey": account.as_hex() }
    });

    let response = engine
        .execute(
            Method::POST,
            &url,
            HeaderMap::new(),
            Some(serde_json::to_vec(&body).unwrap_or_default().into()),
            DEFAULT_TIMEOUT,
            CancellationToken::new(),
        )
        .await?
        .into_result()?;

    let parsed: SwarmResponse = serde_json::from_slice(&response.body)
        .map_err(|e| SnrrError::Protocol(ProtocolError::SnodePoolUpdatingFailed(e.to_string())))?;

    Ok(decode_snode_list(&parsed.snodes).into_iter().collect())
}
