use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method};
use snrr_accountant::{AccountantOutcome, FailureAccountant};
use snrr_crypto::Signer;
use snrr_dispatch::Dispatcher;
use snrr_errors::{ProtocolError, SnrrError, SnrrResult, TransportError};
use snrr_pool::SnodePool;
use snrr_primitives::{AccountId, Snode};
use snrr_storage::Persistence;
use snrr_swarm::SwarmResolver;
use snrr_transport::{Destination, TransportInfo};

use crate::retry::{Backoff, MAX_RETRIES_RPC};
use crate::rpc_call::{local_now_ms, RpcCall};

/// Everything the RPC surface needs: the dispatcher to actually move bytes,
/// the pool/swarm caches to pick and rotate snodes, the accountant to apply
/// status-code rules between retries, and the signer to authenticate
/// requests. Held behind `Arc`s so `SnrrClient` itself stays cheaply
/// cloneable (spec §9: pass one shared context explicitly, not singletons).
pub struct SnrrClient {
    pub(crate) dispatcher: Arc<Dispatcher>,
    pub(crate) pool: Arc<SnodePool>,
    pub(crate) swarm: Arc<SwarmResolver>,
    pub(crate) accountant: Arc<FailureAccountant>,
    pub(crate) storage: Arc<dyn Persistence>,
    pub(crate) signer: Arc<dyn Signer>,
    pub(crate) testnet: bool,
    pub(crate) http_timeout: Duration,
    pub(crate) max_retries: u32,
    pub(crate) target_swarm_snode_count: usize,
}

impl SnrrClient {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        pool: Arc<SnodePool>,
        swarm: Arc<SwarmResolver>,
        accountant: Arc<FailureAccountant>,
        storage: Arc<dyn Persistence>,
        signer: Arc<dyn Signer>,
        testnet: bool,
        http_timeout: Duration,
    ) -> Self {
        Self {
            dispatcher,
            pool,
            swarm,
            accountant,
            storage,
            signer,
            testnet,
            http_timeout,
            max_retries: MAX_RETRIES_RPC,
            target_swarm_snode_count: snrr_swarm::DEFAULT_TARGET_SWARM_SNODE_COUNT,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Override the `send_message` fan-out width (spec §9: a tunable, not a
    /// hard constant).
    pub fn with_target_swarm_snode_count(mut self, count: usize) -> Self {
        self.target_swarm_snode_count = count;
        self
    }

    pub fn testnet(&self) -> bool {
        self.testnet
    }

    pub fn signer(&self) -> &Arc<dyn Signer> {
        &self.signer
    }

    pub fn pool(&self) -> &Arc<SnodePool> {
        &self.pool
    }

    pub fn swarm(&self) -> &Arc<SwarmResolver> {
        &self.swarm
    }

    /// Drive one `RpcCall` to completion: sign, dispatch, run the result
    /// through the failure accountant, and retry with snode rotation up to
    /// `max_retries` on retryable outcomes (spec §4.6/§7).
    pub async fn call<C: RpcCall>(&self, rpc: &C, mut snode: Snode) -> SnrrResult<C::Output> {
        let mut backoff = Backoff::default_curve();
        let mut last_err: Option<SnrrError> = None;

        for attempt in 0..self.max_retries {
            let clock_offset_ms = self.accountant.clock_offset().offset_ms;
            let params = rpc.params(self.signer.as_ref(), clock_offset_ms, self.testnet);
            let request_body = serde_json::to_vec(&serde_json::json!({
                "method": rpc.method(),
                "params": params,
            }))
            .unwrap_or_default();

            let destination = Destination::Snode(snode.clone());
            let result = self
                .dispatcher
                .dispatch(
                    Method::POST,
                    HeaderMap::new(),
                    "storage_rpc_v1",
                    Bytes::from(request_body),
                    &destination,
                    self.http_timeout,
                )
                .await;

            let (status, response_body) = match extract_status(result) {
                Ok(pair) => pair,
                Err(err) => {
                    if !err.is_retryable() || attempt + 1 == self.max_retries {
                        return Err(err);
                    }
                    last_err = Some(err);
                    backoff.sleep_next().await;
                    continue;
                }
            };

            let parsed_body = response_body
                .as_deref()
                .and_then(|b| serde_json::from_slice::<serde_json::Value>(b).ok());
            let failures_before = self.accountant.failure_count(&snode);
            let outcome = self.accountant.apply(status, parsed_body.as_ref(), &snode, local_now_ms());

            match outcome {
                AccountantOutcome::Success { .. } => return rpc.parse_response(response_body),
                AccountantOutcome::ClockOutOfSync => {
                    return Err(SnrrError::Protocol(ProtocolError::ClockOutOfSync));
                }
                AccountantOutcome::SwarmReplaced { snodes } => {
                    let replacement: std::collections::HashSet<Snode> = snodes.into_iter().collect();
                    if let Some(account) = rpc.account() {
                        self.swarm.replace_swarm(account, replacement.clone()).await?;
                    }
                    if let Some(next) = replacement.into_iter().next() {
                        snode = next;
                    }
                    backoff.sleep_next().await;
                }
                AccountantOutcome::SwarmInvalidated => {
                    if let Some(account) = rpc.account() {
                        self.swarm.invalidate(account).await?;
                    }
                    return Err(SnrrError::Protocol(ProtocolError::SnodePoolUpdatingFailed(
                        "swarm invalidated by 421".into(),
                    )));
                }
                AccountantOutcome::Retryable => {
                    if self.accountant.just_crossed_threshold(&snode, failures_before) {
                        let _ = self.pool.drop_snode(&snode).await;
                        if let Some(account) = rpc.account() {
                            let _ = self.swarm.drop_from_swarm(account, &snode).await;
                        }
                    }
                    if attempt + 1 == self.max_retries {
                        return Err(SnrrError::http_status(status, response_body.unwrap_or_default()));
                    }
                    snode = self.rotate_snode(rpc.account(), &snode).await?;
                    backoff.sleep_next().await;
                }
            }
        }

        Err(last_err.unwrap_or(SnrrError::Transport(TransportError::Timeout)))
    }

    /// Pick a different snode than `current` to retry against: from the
    /// account's swarm if this call is account-scoped, otherwise from the
    /// general pool (`get_info` and similar unscoped calls).
    pub(crate) async fn rotate_snode(&self, account: Option<&AccountId>, current: &Snode) -> SnrrResult<Snode> {
        let now = local_now_ms();
        if let Some(account) = account {
            let pool: Vec<Snode> = self.pool.ensure_ready(now).await?.into_iter().collect();
            let swarm = self.swarm.swarm_for(account, &pool).await?;
            swarm
                .into_iter()
                .find(|s| s != current)
                .ok_or_else(|| SnrrError::Protocol(ProtocolError::InsufficientSnodes { needed: 2, have: 1 }))
        } else {
            self.pool
                .ensure_ready(now)
                .await?
                .into_iter()
                .find(|s| s != current)
                .ok_or_else(|| SnrrError::Protocol(ProtocolError::InsufficientSnodes { needed: 2, have: 1 }))
        }
    }
}

/// Fold the dispatcher's two shapes of "there was an HTTP status" — an
/// `Ok` carrying a 2xx [`TransportInfo`] (Direct/NativeLokinet/Lokinet
/// already filtered failures into `Err`) or a non-2xx status embedded in an
/// onion response — into one `(status, body)` pair the accounting step can
/// process uniformly. Genuine transport/crypto/protocol errors pass through
/// unchanged.
fn extract_status(
    result: SnrrResult<(TransportInfo, Option<Bytes>)>,
) -> Result<(u16, Option<Bytes>), SnrrError> {
    match result {
        Ok((info, body)) => Ok((info.code, body)),
        Err(SnrrError::HttpStatus { code, body }) => Ok((code, Some(body))),
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use snrr_crypto::Ed25519Signer;
    use snrr_storage::MemoryPersistence;
    use snrr_transport::mock::MockTransport;
    use snrr_transport::{Layer, LayerSet};

    use super::*;
    use crate::calls::GetInfoCall;

    fn snode(byte: u8) -> Snode {
        Snode::new("127.0.0.1".parse().unwrap(), 1, [byte; 32], [byte; 32])
    }

    fn test_client(transport: MockTransport) -> SnrrClient {
        let mut transports: HashMap<Layer, Arc<dyn snrr_transport::Transport>> = HashMap::new();
        transports.insert(Layer::Direct, Arc::new(transport));
        let dispatcher = Arc::new(Dispatcher::new(transports, LayerSet::single(Layer::Direct)));

        let storage: Arc<dyn snrr_storage::Persistence> = Arc::new(MemoryPersistence::new());
        let engine: Arc<dyn snrr_http::HttpEngine> = Arc::new(DeadEngine);
        let pool = Arc::new(SnodePool::new(engine.clone(), storage.clone(), false));
        let swarm = Arc::new(SwarmResolver::new(engine, storage.clone()));

        SnrrClient::new(
            dispatcher,
            pool,
            swarm,
            Arc::new(FailureAccountant::new()),
            storage,
            Arc::new(Ed25519Signer::random()),
            false,
            Duration::from_secs(5),
        )
    }

    struct DeadEngine;

    #[async_trait::async_trait]
    impl snrr_http::HttpEngine for DeadEngine {
        async fn execute(
            &self,
            _method: Method,
            _url: &str,
            _headers: HeaderMap,
            _body: Option<Bytes>,
            _timeout: Duration,
            _cancel: tokio_util::sync::CancellationToken,
        ) -> SnrrResult<snrr_http::HttpResponse> {
            Err(SnrrError::Transport(TransportError::NotReady))
        }
    }

    #[tokio::test]
    async fn successful_get_info_updates_clock_offset() {
        let server_t = crate::rpc_call::local_now_ms() + 1000;
        let body = Bytes::from(serde_json::to_vec(&serde_json::json!({ "t": server_t })).unwrap());
        let client = test_client(MockTransport::success(Layer::Direct, 200, body));

        let result = client.call(&GetInfoCall, snode(1)).await.unwrap();
        assert_eq!(result, server_t);
        let offset = client.accountant.clock_offset().offset_ms;
        assert!((900..=1100).contains(&offset), "unexpected offset: {offset}");
    }

    #[tokio::test]
    async fn clock_out_of_sync_is_not_retried() {
        let client = test_client(MockTransport::success(Layer::Direct, 406, Bytes::new()));
        let err = client.call(&GetInfoCall, snode(1)).await.unwrap_err();
        assert!(matches!(err, SnrrError::Protocol(ProtocolError::ClockOutOfSync)));
    }
}
