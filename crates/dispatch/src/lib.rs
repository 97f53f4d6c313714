//! Multi-layer dispatcher (component C7): fans the same logical request out
//! across every enabled overlay transport and returns the first response
//! that looks like a genuine snode reply, cancelling the rest.

mod stats;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use dashmap::DashMap;
use http::{HeaderMap, Method};
use parking_lot::Mutex;
use snrr_errors::{SnrrError, SnrrResult, TransportError};
use snrr_transport::{Destination, Layer, LayerSet, Transport, TransportInfo};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

pub use stats::{DispatchStat, Outcome, StatsRing};

/// The multi-layer dispatcher. Holds one transport per [`Layer`] (the
/// "closed sum over a bitmask, not a collection of heterogeneous objects"
/// shape from the design notes) plus a process-wide in-flight table keyed
/// by request id so a layer-set change can cancel everything atomically.
pub struct Dispatcher {
    transports: HashMap<Layer, Arc<dyn Transport>>,
    layers: Mutex<LayerSet>,
    inflight: DashMap<Uuid, CancellationToken>,
    stats: Mutex<StatsRing>,
}

impl Dispatcher {
    pub fn new(transports: HashMap<Layer, Arc<dyn Transport>>, initial_layers: LayerSet) -> Self {
        Self {
            transports,
            layers: Mutex::new(initial_layers),
            inflight: DashMap::new(),
            stats: Mutex::new(StatsRing::new()),
        }
    }

    pub fn layers(&self) -> LayerSet {
        *self.layers.lock()
    }

    /// Switch the active layer set, cancelling every in-flight request
    /// first. Lokinet-context teardown and onion-path invalidation are the
    /// caller's responsibility (`snrr-core::CoreContext`, which owns those
    /// transports concretely) — this only owns cancellation and the bitmask.
    pub fn set_layers(&self, layers: LayerSet) {
        self.cancel_all();
        *self.layers.lock() = layers;
    }

    /// Cancel every currently in-flight request.
    pub fn cancel_all(&self) {
        for entry in self.inflight.iter() {
            entry.value().cancel();
        }
        self.inflight.clear();
    }

    pub fn stats(&self) -> Vec<DispatchStat> {
        self.stats.lock().snapshot()
    }

    /// Dispatch `body` to `destination` across every enabled layer and
    /// return the first valid response (spec §4.7's race rule).
    pub async fn dispatch(
        &self,
        method: Method,
        headers: HeaderMap,
        endpoint: &str,
        body: Bytes,
        destination: &Destination,
        timeout: Duration,
    ) -> SnrrResult<(TransportInfo, Option<Bytes>)> {
        let request_id = Uuid::new_v4();
        let root_cancel = CancellationToken::new();
        self.inflight.insert(request_id, root_cancel.clone());

        let enabled: Vec<Layer> = self.layers().iter().collect();
        if enabled.is_empty() {
            self.inflight.remove(&request_id);
            return Err(SnrrError::Transport(TransportError::NotReady));
        }

        let mut join_set: JoinSet<(Layer, i128, SnrrResult<(TransportInfo, Option<Bytes>)>)> = JoinSet::new();
        for layer in &enabled {
            let Some(transport) = self.transports.get(layer).cloned() else {
                continue;
            };
            let layer = *layer;
            let method = method.clone();
            let headers = headers.clone();
            let endpoint = endpoint.to_string();
            let body = body.clone();
            let destination = destination.clone();
            let child_cancel = root_cancel.child_token();

            join_set.spawn(async move {
                let start = now_ns();
                let result = transport.send(method, headers, &endpoint, body, &destination, timeout, child_cancel).await;
                (layer, start, result)
            });
        }

        let result = self.race(request_id, &enabled, &mut join_set, &root_cancel).await;
        join_set.abort_all();
        self.inflight.remove(&request_id);
        result
    }

    async fn race(
        &self,
        request_id: Uuid,
        enabled: &[Layer],
        join_set: &mut JoinSet<(Layer, i128, SnrrResult<(TransportInfo, Option<Bytes>)>)>,
        root_cancel: &CancellationToken,
    ) -> SnrrResult<(TransportInfo, Option<Bytes>)> {
        let mut first_success: Option<(TransportInfo, Option<Bytes>)> = None;
        let mut first_error: Option<SnrrError> = None;
        let mut recorded: std::collections::HashSet<Layer> = std::collections::HashSet::new();

        while let Some(joined) = join_set.join_next().await {
            let Ok((layer, start, result)) = joined else {
                continue;
            };
            let end = now_ns();

            recorded.insert(layer);

            match result {
                Ok((info, Some(raw_body))) if carries_numeric_t(&raw_body) => {
                    self.record(request_id, layer, start, end, Outcome::Success);
                    root_cancel.cancel();
                    debug!(%layer, "dispatch winner: response carried a numeric t field");
                    self.record_incomplete(request_id, enabled, &recorded, end);
                    return Ok((info, Some(raw_body)));
                }
                Ok(success) => {
                    self.record(request_id, layer, start, end, Outcome::Success);
                    if first_success.is_none() {
                        first_success = Some(success);
                    }
                }
                Err(err @ SnrrError::Transport(TransportError::Timeout)) => {
                    self.record(request_id, layer, start, end, Outcome::Timeout);
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
                Err(err) => {
                    self.record(request_id, layer, start, end, Outcome::Error);
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        match (first_success, first_error) {
            (Some(success), _) => Ok(success),
            (None, Some(err)) => Err(err),
            (None, None) => {
                warn!("dispatch race produced no completions at all");
                Err(SnrrError::Transport(TransportError::Cancelled))
            }
        }
    }

    fn record_incomplete(&self, request_id: Uuid, enabled: &[Layer], recorded: &std::collections::HashSet<Layer>, at_ns: i128) {
        for layer in enabled {
            if !recorded.contains(layer) {
                self.record(request_id, *layer, at_ns, at_ns, Outcome::Incomplete);
            }
        }
    }

    fn record(&self, request_id: Uuid, layer: Layer, start_unix_ns: i128, end_unix_ns: i128, outcome: Outcome) {
        self.stats.lock().push(DispatchStat {
            layer,
            request_id,
            start_unix_ns,
            end_unix_ns,
            outcome,
        });
    }
}

fn now_ns() -> i128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos() as i128).unwrap_or(0)
}

fn carries_numeric_t(body: &Bytes) -> bool {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("t").cloned())
        .is_some_and(|t| t.is_number())
}

#[cfg(test)]
mod tests {
    use super::*;
    use snrr_transport::mock::MockTransport;

    fn dest() -> Destination {
        Destination::Snode(snrr_primitives_for_tests::snode())
    }

    mod snrr_primitives_for_tests {
        pub fn snode() -> snrr_primitives::Snode {
            snrr_primitives::Snode::new("127.0.0.1".parse().unwrap(), 1, [1u8; 32], [1u8; 32])
        }
    }

    #[tokio::test]
    async fn single_layer_is_a_pass_through() {
        let mut transports: HashMap<Layer, Arc<dyn Transport>> = HashMap::new();
        transports.insert(
            Layer::Direct,
            Arc::new(MockTransport::success(Layer::Direct, 200, Bytes::from_static(b"{\"t\":5}"))),
        );
        let dispatcher = Dispatcher::new(transports, LayerSet::single(Layer::Direct));

        let (info, body) = dispatcher
            .dispatch(Method::POST, HeaderMap::new(), "retrieve", Bytes::new(), &dest(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(info.layer, Layer::Direct);
        assert_eq!(body.unwrap(), Bytes::from_static(b"{\"t\":5}"));
    }

    #[tokio::test]
    async fn no_enabled_layers_is_not_ready() {
        let dispatcher = Dispatcher::new(HashMap::new(), LayerSet::EMPTY);
        let err = dispatcher
            .dispatch(Method::POST, HeaderMap::new(), "retrieve", Bytes::new(), &dest(), Duration::from_secs(1))
            .await;
        assert!(matches!(err, Err(SnrrError::Transport(TransportError::NotReady))));
    }

    #[tokio::test]
    async fn set_layers_cancels_inflight_requests_table() {
        let mut transports: HashMap<Layer, Arc<dyn Transport>> = HashMap::new();
        transports.insert(Layer::Direct, Arc::new(MockTransport::success(Layer::Direct, 200, Bytes::new())));
        let dispatcher = Dispatcher::new(transports, LayerSet::single(Layer::Direct));
        dispatcher
            .dispatch(Method::POST, HeaderMap::new(), "retrieve", Bytes::new(), &dest(), Duration::from_secs(1))
            .await
            .unwrap();

        dispatcher.set_layers(LayerSet::single(Layer::Lokinet));
        assert_eq!(dispatcher.layers(), LayerSet::single(Layer::Lokinet));
    }
}
