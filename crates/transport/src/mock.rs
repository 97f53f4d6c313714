//! A scripted [`Transport`] for tests in this crate and downstream crates
//! (`snrr-dispatch`, `snrr-rpc`) that need a transport layer without real
//! network I/O.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method};
use parking_lot::Mutex;
use snrr_errors::SnrrResult;
use tokio_util::sync::CancellationToken;

use crate::destination::Destination;
use crate::layer::Layer;
use crate::transport_trait::{Transport, TransportInfo};

/// One scripted outcome for a single `send` call.
pub type ScriptedResult = SnrrResult<(TransportInfo, Option<Bytes>)>;

/// Replays a fixed queue of results, one per call, regardless of what was
/// asked for. Once the queue is drained, every further call repeats the
/// last scripted result — most tests only care about the first few calls
/// and this avoids panicking on an unanticipated extra retry.
pub struct MockTransport {
    layer: Layer,
    queue: Mutex<VecDeque<ScriptedResult>>,
    calls: Mutex<Vec<(Method, String, Bytes)>>,
}

impl MockTransport {
    pub fn new(layer: Layer, results: impl IntoIterator<Item = ScriptedResult>) -> Self {
        Self {
            layer,
            queue: Mutex::new(results.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A single always-succeed mock, useful when the test only cares about
    /// dispatch plumbing and not about transport-level failure behavior.
    pub fn success(layer: Layer, code: u16, body: Bytes) -> Self {
        Self::new(
            layer,
            [Ok((TransportInfo { layer, code }, Some(body)))],
        )
    }

    /// The `(method, endpoint, body)` of every call made so far, in order.
    pub fn calls(&self) -> Vec<(Method, String, Bytes)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn layer(&self) -> Layer {
        self.layer
    }

    async fn send(
        &self,
        method: Method,
        _headers: HeaderMap,
        endpoint: &str,
        body: Bytes,
        _destination: &Destination,
        _timeout: Duration,
        _cancel: CancellationToken,
    ) -> ScriptedResult {
        self.calls.lock().push((method, endpoint.to_string(), body));

        let mut queue = self.queue.lock();
        match queue.len() {
            0 => panic!("MockTransport called with no scripted results queued"),
            1 => clone_result(&queue[0]),
            _ => queue.pop_front().expect("checked non-empty above"),
        }
    }
}

fn clone_result(result: &ScriptedResult) -> ScriptedResult {
    match result {
        Ok((info, body)) => Ok((*info, body.clone())),
        Err(err) => Err(err.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snrr_primitives::Snode;

    fn dest() -> Destination {
        Destination::Snode(Snode::new("127.0.0.1".parse().unwrap(), 1, [0u8; 32], [0u8; 32]))
    }

    #[tokio::test]
    async fn records_calls_and_replays_last_result() {
        let mock = MockTransport::success(Layer::Direct, 200, Bytes::from_static(b"ok"));
        let (info, body) = mock
            .send(
                Method::POST,
                HeaderMap::new(),
                "store",
                Bytes::from_static(b"req"),
                &dest(),
                Duration::from_secs(1),
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(info.code, 200);
        assert_eq!(body.unwrap(), Bytes::from_static(b"ok"));

        let (info2, _) = mock
            .send(
                Method::POST,
                HeaderMap::new(),
                "store",
                Bytes::from_static(b"req2"),
                &dest(),
                Duration::from_secs(1),
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(info2.code, 200);
        assert_eq!(mock.calls().len(), 2);
    }
}
