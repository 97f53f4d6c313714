use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use snrr_errors::{SnrrError, SnrrResult, TransportError};
use tokio_util::sync::CancellationToken;

use crate::engine::HttpEngine;

/// POST a JSON-encodable body and decode a JSON response, propagating
/// `ParsingFailed`-equivalent errors (`InvalidJson`) on malformed output.
pub async fn send_json<B: Serialize + Sync, R: DeserializeOwned>(
    engine: &dyn HttpEngine,
    url: &str,
    body: &B,
    mut headers: HeaderMap,
    timeout: Duration,
    cancel: CancellationToken,
) -> SnrrResult<R> {
    let encoded = serde_json::to_vec(body)
        .map_err(|e| SnrrError::Transport(TransportError::InvalidJson(e.to_string())))?;
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    let response = engine
        .execute(
            Method::POST,
            url,
            headers,
            Some(Bytes::from(encoded)),
            timeout,
            cancel,
        )
        .await?
        .into_result()?;

    decode_json(&response.body)
}

/// Decode a JSON body, surfacing decode failures as `InvalidJson` rather
/// than panicking or losing the underlying serde error text.
pub fn decode_json<R: DeserializeOwned>(body: &[u8]) -> SnrrResult<R> {
    serde_json::from_slice(body)
        .map_err(|e| SnrrError::Transport(TransportError::InvalidJson(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, PartialEq, Debug)]
    struct Echo {
        value: i32,
    }

    #[test]
    fn decode_json_surfaces_parse_errors() {
        let result: SnrrResult<Echo> = decode_json(b"not json");
        assert!(matches!(
            result,
            Err(SnrrError::Transport(TransportError::InvalidJson(_)))
        ));
    }

    #[test]
    fn decode_json_succeeds_on_well_formed_body() {
        let result: Echo = decode_json(br#"{"value": 42}"#).unwrap();
        assert_eq!(result, Echo { value: 42 });
    }
}
