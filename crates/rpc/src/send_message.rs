use std::collections::HashMap;

use futures::future::join_all;
use snrr_errors::{ProtocolError, SnrrError, SnrrResult};
use snrr_primitives::{AccountId, Namespace, Snode};

use crate::calls::StoreAck;
use crate::client::SnrrClient;
use crate::rpc_call::local_now_ms;

/// `send_message(msg, namespace)` — stores a single ciphertext against
/// every snode in `target_snodes(account)` (spec §4.6, §9: the fan-out
/// count is a tunable, currently [`snrr_swarm::DEFAULT_TARGET_SWARM_SNODE_COUNT`]).
/// Returns one result per snode rather than collapsing to a single
/// success/failure, so a caller can tell exactly which replicas accepted
/// the write.
impl SnrrClient {
    pub async fn send_message(
        &self,
        account: &AccountId,
        namespace: Namespace,
        data: Vec<u8>,
        ttl_ms: i64,
    ) -> SnrrResult<Vec<(Snode, SnrrResult<HashMap<String, StoreAck>>)>> {
        let pool: Vec<Snode> = self.pool.ensure_ready(local_now_ms()).await?.into_iter().collect();
        // populates the swarm cache as a side effect; `target_snodes` then reads it
        self.swarm.swarm_for(account, &pool).await?;

        let targets = self.swarm.target_snodes(account, self.target_swarm_snode_count);
        if targets.is_empty() {
            return Err(SnrrError::Protocol(ProtocolError::InsufficientSnodes { needed: 1, have: 0 }));
        }

        let futures = targets.into_iter().map(|snode| {
            let data = data.clone();
            async move {
                let result = self.store(account, namespace, data, ttl_ms, snode.clone()).await;
                (snode, result)
            }
        });

        Ok(join_all(futures).await)
    }
}
