use std::collections::HashMap;

use rand::seq::SliceRandom;
use snrr_crypto::decrypt_ons_value;
use snrr_errors::{ProtocolError, SnrrError, SnrrResult};
use snrr_primitives::{AccountId, Namespace, Snode};

use crate::calls::{
    require_consistent, DeleteAllCall, DeleteCall, ExpireAck, ExpireCall, GetInfoCall, OnsResolveCall,
    RetrieveResult, RevokeSubkeyCall, StoreAck, StoreCall,
};
use crate::client::SnrrClient;
use crate::rpc_call::local_now_ms;

/// Single, typed entry points over `SnrrClient::call`'s shared driver
/// (spec §4.6's operation table). Batched retrieval lives in
/// [`crate::batch`] and fan-out delivery in [`crate::send_message`].
impl SnrrClient {
    /// Resumes from the persisted `last_hash` cursor for this
    /// `(account, namespace, snode)` triple, if any, and persists whatever
    /// cursor the response carries back (spec §3/§8 S3). A cursor pointing
    /// at an already-expired message is pruned rather than resumed from.
    pub async fn retrieve(
        &self,
        account: &AccountId,
        namespace: Namespace,
        subkey: Option<Vec<u8>>,
        snode: Snode,
    ) -> SnrrResult<RetrieveResult> {
        let now_ms = local_now_ms() + self.accountant.clock_offset().offset_ms;
        let last_hash = crate::cursor::load(self.storage.as_ref(), account, namespace, &snode, now_ms).await?;

        let call = crate::calls::RetrieveCall {
            account: account.clone(),
            namespace,
            last_hash,
            subkey,
        };
        let result = self.call(&call, snode.clone()).await?;
        crate::cursor::persist(self.storage.as_ref(), account, namespace, &snode, &result).await?;
        Ok(result)
    }

    pub async fn store(
        &self,
        account: &AccountId,
        namespace: Namespace,
        data: Vec<u8>,
        ttl_ms: i64,
        snode: Snode,
    ) -> SnrrResult<HashMap<String, StoreAck>> {
        let call = StoreCall {
            account: account.clone(),
            namespace,
            data,
            ttl_ms,
        };
        self.call(&call, snode).await
    }

    pub async fn delete_messages(
        &self,
        account: &AccountId,
        hashes: Vec<String>,
        snode: Snode,
    ) -> SnrrResult<HashMap<String, bool>> {
        let call = DeleteCall { account: account.clone(), hashes };
        self.call(&call, snode).await
    }

    pub async fn update_expiry(
        &self,
        account: &AccountId,
        hashes: Vec<String>,
        new_expiry_ms: i64,
        subkey: Option<Vec<u8>>,
        snode: Snode,
    ) -> SnrrResult<HashMap<String, ExpireAck>> {
        let call = ExpireCall {
            account: account.clone(),
            hashes,
            expiry_ms: new_expiry_ms,
            subkey,
        };
        self.call(&call, snode).await
    }

    pub async fn revoke_subkey(&self, account: &AccountId, subkey: Vec<u8>, snode: Snode) -> SnrrResult<()> {
        let call = RevokeSubkeyCall { account: account.clone(), subkey };
        self.call(&call, snode).await
    }

    pub async fn get_info(&self, snode: Snode) -> SnrrResult<i64> {
        self.call(&GetInfoCall, snode).await
    }

    /// Fetches the server's own timestamp first so the deletion is bound to
    /// its clock rather than the caller's (spec §4.6).
    pub async fn delete_all(
        &self,
        account: &AccountId,
        namespace: Option<i32>,
        before_ms: Option<i64>,
        snode: Snode,
    ) -> SnrrResult<HashMap<String, bool>> {
        let server_timestamp_ms = self.get_info(snode.clone()).await?;
        let call = DeleteAllCall {
            account: account.clone(),
            namespace,
            before_ms,
            server_timestamp_ms,
        };
        self.call(&call, snode).await
    }

    /// Resolves a lowercase Session name by querying three distinct random
    /// pool snodes, requiring all three to return the same encrypted mapping
    /// (spec §4.6: a cryptographic-consistency check, not a majority vote),
    /// then decrypting it with the name-derived key to recover the hex
    /// session id.
    pub async fn resolve_ons(&self, name: &str) -> SnrrResult<String> {
        let pool: Vec<Snode> = self.pool.ensure_ready(local_now_ms()).await?.into_iter().collect();
        let chosen = choose_distinct(&pool, 3)?;

        let mut results = Vec::with_capacity(3);
        for snode in chosen {
            let call = OnsResolveCall::for_name(name);
            results.push(self.call(&call, snode).await?);
        }
        let encrypted = require_consistent(&results)?;
        decrypt_ons_value(name, &encrypted).map_err(SnrrError::Crypto)
    }
}

fn choose_distinct(pool: &[Snode], count: usize) -> SnrrResult<Vec<Snode>> {
    if pool.len() < count {
        return Err(SnrrError::Protocol(ProtocolError::InsufficientSnodes { needed: count, have: pool.len() }));
    }
    let mut rng = rand::thread_rng();
    Ok(pool.choose_multiple(&mut rng, count).cloned().collect())
}
