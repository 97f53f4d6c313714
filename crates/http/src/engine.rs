use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use snrr_errors::{SnrrError, SnrrResult, TransportError};
use tokio_util::sync::CancellationToken;

/// The decoded result of a single HTTP round trip.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn into_result(self) -> SnrrResult<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(SnrrError::http_status(self.status.as_u16(), self.body))
        }
    }
}

/// Typed HTTP verbs, JSON coding, cancellation, and timeouts. One engine
/// backs every overlay transport; it performs no retries.
#[async_trait]
pub trait HttpEngine: Send + Sync {
    async fn execute(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> SnrrResult<HttpResponse>;
}

/// The production [`HttpEngine`], backed by a shared `reqwest::Client`.
pub struct ReqwestEngine {
    client: reqwest::Client,
    max_file_size_bytes: usize,
}

impl ReqwestEngine {
    pub fn new(max_file_size_bytes: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            max_file_size_bytes,
        }
    }

    pub fn with_client(client: reqwest::Client, max_file_size_bytes: usize) -> Self {
        Self {
            client,
            max_file_size_bytes,
        }
    }
}

#[async_trait]
impl HttpEngine for ReqwestEngine {
    async fn execute(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> SnrrResult<HttpResponse> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| SnrrError::Transport(TransportError::InvalidUrl(e.to_string())))?;

        let mut builder = self.client.request(method, parsed).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        let request = builder.timeout(timeout);

        let send_fut = request.send();
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(SnrrError::Transport(TransportError::Cancelled)),
            result = send_fut => {
                let response = match result {
                    Ok(response) => response,
                    Err(err) if err.is_timeout() => return Err(SnrrError::Transport(TransportError::Timeout)),
                    Err(err) => return Err(SnrrError::Transport(TransportError::ConnectionFailed(err.to_string()))),
                };

                let status = response.status();
                let headers = response.headers().clone();
                if let Some(len) = response.content_length() {
                    if len as usize > self.max_file_size_bytes {
                        return Err(SnrrError::Transport(TransportError::MaxFileSizeExceeded));
                    }
                }

                let bytes_fut = response.bytes();
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => Err(SnrrError::Transport(TransportError::Cancelled)),
                    body = bytes_fut => {
                        let body = body.map_err(|e| SnrrError::Transport(TransportError::ConnectionFailed(e.to_string())))?;
                        if body.len() > self.max_file_size_bytes {
                            return Err(SnrrError::Transport(TransportError::MaxFileSizeExceeded));
                        }
                        Ok(HttpResponse { status, headers, body })
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_url_is_rejected_before_any_io() {
        let engine = ReqwestEngine::new(10 * 1024 * 1024);
        let result = engine
            .execute(
                Method::GET,
                "not a url",
                HeaderMap::new(),
                None,
                Duration::from_secs(1),
                CancellationToken::new(),
            )
            .await;
        assert!(matches!(
            result,
            Err(SnrrError::Transport(TransportError::InvalidUrl(_)))
        ));
    }

    #[tokio::test]
    async fn cancellation_short_circuits_before_send() {
        let engine = ReqwestEngine::new(10 * 1024 * 1024);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = engine
            .execute(
                Method::GET,
                "https://example.invalid/",
                HeaderMap::new(),
                None,
                Duration::from_secs(1),
                cancel,
            )
            .await;
        assert!(matches!(
            result,
            Err(SnrrError::Transport(TransportError::Cancelled))
        ));
    }
}
