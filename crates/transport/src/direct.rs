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
use crate::transport_trait::{Transport, TransportInfo};

/// Plain, unanonymized HTTP(S): used for diagnostics and for comparing the
/// other layers' latency/success rate against a baseline.
pub struct DirectTransport {
    engine: Arc<dyn HttpEngine>,
}

impl DirectTransport {
    pub fn new(engine: Arc<dyn HttpEngine>) -> Self {
        Self { engine }
    }

    fn url_for(destination: &Destination, endpoint: &str) -> String {
        match destination {
            Destination::Snode(snode) => format!("{}/{endpoint}", snode.base_url("https")),
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
impl Transport for DirectTransport {
    fn layer(&self) -> Layer {
        Layer::Direct
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
                layer: Layer::Direct,
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
    fn snode_url_includes_endpoint() {
        let snode = snrr_primitives::Snode::new(
            "10.0.0.1".parse().unwrap(),
            4433,
            [1u8; 32],
            [2u8; 32],
        );
        let dest = Destination::Snode(snode);
        let url = DirectTransport::url_for(&dest, "storage_rpc_v1");
        assert_eq!(url, "https://10.0.0.1:4433/storage_rpc_v1");
    }

    #[test]
    fn server_url_joins_target_and_endpoint() {
        let dest = Destination::Server {
            host: "filev2.getsession.org".into(),
            target: "/file".into(),
            x25519_pk: [0u8; 32],
            scheme: "https".into(),
            port: 443,
        };
        let url = DirectTransport::url_for(&dest, "upload");
        assert_eq!(url, "https://filev2.getsession.org:443/file/upload");
    }
}
