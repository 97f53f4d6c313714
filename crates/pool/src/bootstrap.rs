use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, Method};
use rand::seq::SliceRandom;
use snrr_errors::{ProtocolError, SnrrError, SnrrResult};
use snrr_http::HttpEngine;
use snrr_primitives::{decode_snode_list, Snode, MAX_POOL, MIN_BOOTSTRAP};
use tokio_util::sync::CancellationToken;

use crate::seeds::seed_urls;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// `POST {seed}/json_rpc` asking for up to `MAX_POOL` active nodes. Decodes
/// tolerantly: malformed entries are dropped rather than failing the batch.
pub async fn bootstrap_from_seeds(engine: &Arc<dyn HttpEngine>, testnet: bool) -> SnrrResult<Vec<Snode>> {
    let urls = seed_urls(testnet);
    let url = urls
        .choose(&mut rand::thread_rng())
        .ok_or_else(|| SnrrError::Protocol(ProtocolError::Generic("no seed urls configured".into())))?;

    let body = serde_json::json!({
        "endpoint": "get_n_service_nodes",
        "params": {
            "active_only": true,
            "limit": MAX_POOL,
            "fields": {
                "public_ip": true,
                "storage_port": true,
                "pubkey_ed25519": true,
                "pubkey_x25519": true,
            }
        }
    });

    let response = engine
        .execute(
            Method::POST,
            url,
            HeaderMap::new(),
            Some(serde_json::to_vec(&body).unwrap_or_default().into()),
            DEFAULT_TIMEOUT,
            CancellationToken::new(),
        )
        .await?
        .into_result()?;

    let parsed: serde_json::Value = serde_json::from_slice(&response.body)
        .map_err(|e| SnrrError::Protocol(ProtocolError::SnodePoolUpdatingFailed(e.to_string())))?;

    let nodes_field = parsed.get("service_node_states").or_else(|| parsed.get("nodes")).unwrap_or(&parsed);
    Ok(decode_snode_list(nodes_field).into_iter().take(MAX_POOL).collect())
}

/// Query 3 distinct snodes from the current pool for the full node list,
/// intersect the three results, and require the intersection to exceed
/// [`MIN_BOOTSTRAP`] before it is trusted.
pub async fn refresh_from_peers(engine: &Arc<dyn HttpEngine>, pool: &[Snode]) -> SnrrResult<Vec<Snode>> {
    let mut rng = rand::thread_rng();
    let chosen: Vec<&Snode> = pool.choose_multiple(&mut rng, 3).collect();
    if chosen.len() < 3 {
        return Err(SnrrError::Protocol(ProtocolError::InsufficientSnodes {
            needed: 3,
            have: chosen.len(),
        }));
    }

    let mut sets = Vec::with_capacity(3);
    for snode in chosen {
        sets.push(query_full_node_list(engine, snode).await?);
    }

    let intersection = intersect_all(sets);
    if intersection.len() <= MIN_BOOTSTRAP {
        return Err(SnrrError::Protocol(ProtocolError::InconsistentSnodePools));
    }

    Ok(intersection.into_iter().take(MAX_POOL).collect())
}

async fn query_full_node_list(engine: &Arc<dyn HttpEngine>, snode: &Snode) -> SnrrResult<HashSet<Snode>> {
    let url = format!("{}/storage_rpc_v1", snode.base_url("https"));
    let body = serde_json::json!({ "method": "get_service_nodes", "params": {} });

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

    let parsed: serde_json::Value = serde_json::from_slice(&response.body)
        .map_err(|e| SnrrError::Protocol(ProtocolError::SnodePoolUpdatingFailed(e.to_string())))?;

    let nodes_field = parsed.get("service_node_states").or_else(|| parsed.get("nodes")).unwrap_or(&parsed);
    Ok(decode_snode_list(nodes_field).into_iter().collect())
}

fn intersect_all(sets: Vec<HashSet<Snode>>) -> HashSet<Snode> {
    let mut iter = sets.into_iter();
    let Some(first) = iter.next() else {
        return HashSet::new();
    };
    iter.fold(first, |acc, set| acc.intersection(&set).cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snode(byte: u8) -> Snode {
        Snode::new("127.0.0.1".parse().unwrap(), 1, [byte; 32], [byte; 32])
    }

    #[test]
    fn intersection_keeps_only_common_entries() {
        let a: HashSet<Snode> = [snode(1), snode(2), snode(3)].into_iter().collect();
        let b: HashSet<Snode> = [snode(2), snode(3), snode(4)].into_iter().collect();
        let c: HashSet<Snode> = [snode(2), snode(3), snode(5)].into_iter().collect();
        let result = intersect_all(vec![a, b, c]);
        assert_eq!(result, [snode(2), snode(3)].into_iter().collect());
    }

    #[test]
    fn intersection_of_empty_input_is_empty() {
        assert!(intersect_all(Vec::new()).is_empty());
    }
}
