mod community;
mod context;
pub(crate) mod hostname;

pub use context::{LokinetContext, LokinetContextStatus, LokinetResolver};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method};
use snrr_errors::{SnrrError, SnrrResult, TransportError};
use snrr_http::HttpEngine;
use tokio_util::sync::CancellationToken;

use crate::destination::Destination;
use crate::layer::Layer;
use crate::transport_trait::{Transport, TransportInfo};

/// Resolves `.loki`/`.snode` hostnames through a local Lokinet context,
/// then issues plain HTTP(S) to the loopback address it resolves to.
///
/// Snode destinations use HTTPS with a self-signed certificate (the tunnel
/// itself already authenticates the peer via its Lokinet address, so the
/// usual TLS chain-of-trust doesn't apply). Community server destinations
/// are resolved through a fixed host map and use plain HTTP, since the
/// Lokinet tunnel already encrypts the link.
pub struct LokinetTransport {
    context: Arc<LokinetContext>,
    engine: Arc<dyn HttpEngine>,
}

impl LokinetTransport {
    pub fn new(context: Arc<LokinetContext>, engine: Arc<dyn HttpEngine>) -> Self {
        Self { context, engine }
    }

    fn hostname_and_scheme(destination: &Destination) -> SnrrResult<(String, &'static str, Option<u16>)> {
        match destination {
            Destination::Snode(snode) => {
                Ok((hostname::snode_hostname(&snode.ed25519_pubkey), "https", None))
            }
            Destination::Server { host, .. } => match community::lookup(host) {
                Some((loki_host, port)) => Ok((loki_host.to_string(), "http", Some(port))),
                None => Err(SnrrError::Transport(TransportError::InvalidUrl(host.clone()))),
            },
        }
    }
}

#[async_trait]
impl Transport for LokinetTransport {
    fn layer(&self) -> Layer {
        Layer::Lokinet
    }

    async fn send(
        &self,
        method: Method,
        headers: HeaderMap,
        endpoint: &str,
        body: Bytes,
        destination: &Destination,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> SnrrResult<(TransportInfo, Option<Bytes>)> {
        self.context.ensure_started();

        let (hostname, scheme, community_port) = Self::hostname_and_scheme(destination)?;

        if !matches!(self.context.status(), LokinetContextStatus::Ready) {
            return Err(SnrrError::Transport(TransportError::NotReady));
        }

        let loopback = self.context.resolve(&hostname)?;
        let port = community_port.unwrap_or(loopback.port());
        let url = format!("{scheme}://{}:{port}/{endpoint}", loopback.ip());

        let response = self
            .engine
            .execute(method, &url, headers, Some(body), timeout, cancel)
            .await?
            .into_result()?;

        Ok((
            TransportInfo {
                layer: Layer::Lokinet,
                code: response.status.as_u16(),
            },
            Some(response.body),
        ))
    }
}
