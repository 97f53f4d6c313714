use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method};
use snrr_errors::SnrrResult;
use snrr_http::HttpEngine;
use tokio_util::sync::CancellationToken;

use crate::destination::Destination;
use crate::layer::Layer;
use crate::lokinet::hostname;
use crate::transport_trait::{Transport, TransportInfo};

/// Lokinet tunneled through the OS network stack (a router running
/// Lokinet natively, or an embedded exit on the device) rather than through
/// an in-process context. Hostname derivation is identical to
/// [`crate::lokinet::LokinetTransport`]; the difference is purely in who
/// resolves it — here, ordinary OS DNS/`.loki` resolution, so there is no
/// context readiness to poll.
pub struct NativeLokinetTransport {
    engine: Arc<dyn HttpEngine>,
}

impl NativeLokinetTransport {
    pub fn new(engine: Arc<dyn HttpEngine>) -> Self {
        Self { engine }
    }

    fn url_for(destination: &Destination, endpoint: &str) -> String {
        match destination {
            Destination::Snode(snode) => {
                let host = hostname::snode_hostname(&snode.ed25519_pubkey);
                format!("https://{host}/{endpoint}")
            }
            Destination::Server {
                host,
                scheme,
                port,
                target,
                ..
            } => format!("{scheme}://{host}:{port}{target}/{endpoint}"),
        }
    }
}

#[async_trait]
impl Transport for NativeLokinetTransport {
    fn layer(&self) -> Layer {
        Layer::NativeLokinet
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
        let url = Self::url_for(destination, endpoint);
        let response = self
            .engine
            .execute(method, &url, headers, Some(body), timeout, cancel)
            .await?
            .into_result()?;

        Ok((
            TransportInfo {
                layer: Layer::NativeLokinet,
                code: response.status.as_u16(),
            },
            Some(response.body),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snode_url_uses_derived_hostname() {
        let snode = snrr_primitives::Snode::new("10.0.0.1".parse().unwrap(), 4433, [7u8; 32], [8u8; 32]);
        let dest = Destination::Snode(snode);
        let url = NativeLokinetTransport::url_for(&dest, "storage_rpc_v1");
        assert!(url.starts_with("https://"));
        assert!(url.ends_with(".snode/storage_rpc_v1"));
    }
}
