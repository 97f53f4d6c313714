mod path;

pub use path::{OnionPath, PathHop};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method};
use snrr_errors::{SnrrError, SnrrResult, TransportError};
use snrr_http::HttpEngine;
use snrr_primitives::Snode;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::destination::Destination;
use crate::layer::Layer;
use crate::transport_trait::{Transport, TransportInfo};

/// The opaque onion wire codec (spec §1 non-goal): wraps a plaintext payload
/// in layered encryption addressed to a path, and unwraps a layered response
/// back down to plaintext plus the embedded destination status code. A real
/// implementation speaks the onion-request v3/v4 wire format against each
/// hop's x25519 key; this crate only models path lifecycle around it, the
/// same way [`crate::lokinet::LokinetResolver`] stands in for libLokinet.
pub trait SymmetricLayerCodec: Send + Sync {
    /// Encrypt `payload` in layers addressed to each hop of `path`, ending at
    /// `destination`.
    fn wrap(&self, path: &OnionPath, destination: &Destination, payload: &[u8]) -> SnrrResult<Bytes>;

    /// Decrypt a layered response, returning the destination's embedded
    /// status code and the plaintext body.
    fn unwrap(&self, path: &OnionPath, response: &[u8]) -> SnrrResult<(u16, Bytes)>;
}

/// Builds and rebuilds a three-hop onion path lazily, and routes requests
/// through it via an injected [`SymmetricLayerCodec`].
///
/// Path state lives behind a `tokio::sync::RwLock` rather than `parking_lot`
/// because building a path is itself async (it goes over the wire to pick
/// guard/relay candidates); holding a sync lock across that would be wrong.
/// A failed hop tears the whole path down rather than patching just that
/// hop, matching the onion-request guidance that a broken path is unsafe to
/// partially repair.
pub struct OnionTransport {
    engine: Arc<dyn HttpEngine>,
    codec: Arc<dyn SymmetricLayerCodec>,
    path: RwLock<Option<OnionPath>>,
    guard_candidates: Vec<Snode>,
}

impl OnionTransport {
    pub fn new(
        engine: Arc<dyn HttpEngine>,
        codec: Arc<dyn SymmetricLayerCodec>,
        guard_candidates: Vec<Snode>,
    ) -> Self {
        Self {
            engine,
            codec,
            path: RwLock::new(None),
            guard_candidates,
        }
    }

    /// Tear down the current path, forcing the next `send` to rebuild one.
    /// Called by the dispatcher when a hop reports failure or when layers
    /// are reconfigured (spec §9: disabling onion must not leave a stale
    /// path lying around for a later re-enable to reuse blindly).
    pub async fn rebuild(&self) {
        let mut guard = self.path.write().await;
        *guard = None;
    }

    async fn ensure_path(&self) -> SnrrResult<OnionPath> {
        {
            let guard = self.path.read().await;
            if let Some(path) = guard.as_ref() {
                return Ok(path.clone());
            }
        }

        let mut guard = self.path.write().await;
        if let Some(path) = guard.as_ref() {
            return Ok(path.clone());
        }

        let path = OnionPath::build(&self.guard_candidates)?;
        debug!(guard = %path.guard(), "built onion path");
        *guard = Some(path.clone());
        Ok(path)
    }
}

#[async_trait]
impl Transport for OnionTransport {
    fn layer(&self) -> Layer {
        Layer::Onion
    }

    async fn send(
        &self,
        _method: Method,
        _headers: HeaderMap,
        endpoint: &str,
        body: Bytes,
        destination: &Destination,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> SnrrResult<(TransportInfo, Option<Bytes>)> {
        let path = self.ensure_path().await?;
        let wrapped = self.codec.wrap(&path, destination, &body)?;

        // Snode storage RPC speaks onion-request v3; server endpoints (file
        // server, community hosts) speak v4 (spec §4.2).
        let lsrpc_version = match destination {
            Destination::Snode(_) => "v3",
            Destination::Server { .. } => "v4",
        };
        let guard_url = format!("{}/oxen/{lsrpc_version}/lsrpc", path.guard().base_url("https"));
        let request_fut = self.engine.execute(
            Method::POST,
            &guard_url,
            HeaderMap::new(),
            Some(wrapped),
            timeout,
            cancel,
        );

        let response = match request_fut.await {
            Ok(response) => response,
            Err(err) => {
                warn!(guard = %path.guard(), error = %err, "onion guard hop failed, tearing down path");
                self.rebuild().await;
                return Err(err);
            }
        };

        let response = response.into_result()?;
        let (code, body) = self.codec.unwrap(&path, &response.body)?;

        if code == 0 {
            return Err(SnrrError::Transport(TransportError::ConnectionFailed(format!(
                "onion response for {endpoint} carried no destination status"
            ))));
        }

        Ok((TransportInfo { layer: Layer::Onion, code }, Some(body)))
    }
}
