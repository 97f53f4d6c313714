use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method};
use snrr_errors::SnrrResult;
use tokio_util::sync::CancellationToken;

use crate::destination::Destination;
use crate::layer::Layer;

/// The result of a single transport round trip.
///
/// `code` mirrors the HTTP status for [`Layer::Direct`] and
/// [`Layer::NativeLokinet`]/[`Layer::Lokinet`] (they terminate in a real
/// HTTP response); onion responses carry their own embedded status, and a
/// transport that cannot observe one reports a synthetic `0`.
#[derive(Debug, Clone, Copy)]
pub struct TransportInfo {
    pub layer: Layer,
    pub code: u16,
}

/// Shared contract implemented by all four overlay transports.
///
/// Failure classification (spec §4.2) is carried entirely by `SnrrError`:
/// `Timeout`, `Cancelled`, `InvalidUrl`, `NotReady` map to
/// `SnrrError::Transport`, and `HttpFailed(status, data)` maps to
/// `SnrrError::HttpStatus`.
#[async_trait]
pub trait Transport: Send + Sync {
    fn layer(&self) -> Layer;

    async fn send(
        &self,
        method: Method,
        headers: HeaderMap,
        endpoint: &str,
        body: Bytes,
        destination: &Destination,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> SnrrResult<(TransportInfo, Option<Bytes>)>;
}
