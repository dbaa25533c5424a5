//! JSON-over-HTTP transport for the Logseq plugin API.
//!
//! One POST per call to `{host}/api` with body `{"method": ..., "args": [...]}`
//! and bearer-token authorization. The transport maps HTTP-level failures to
//! [`ApiError`] discriminants; interpreting payloads is left to the typed
//! client variants.

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    method: &'a str,
    args: &'a [Value],
}

/// Shared HTTP transport. Thread-safe and cheaply cloneable (shares the
/// reqwest client internally).
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    host: String,
    token: String,
}

impl HttpTransport {
    /// Build a transport for the given API server.
    ///
    /// The host is validated up front so a misconfigured URL surfaces as
    /// [`ApiError::InvalidHost`] instead of a failure on first use.
    pub fn new(host: &str, token: &str, timeout: Duration) -> Result<Self, ApiError> {
        let trimmed = host.trim_end_matches('/');
        let parsed = reqwest::Url::parse(trimmed).map_err(|e| ApiError::InvalidHost {
            host: host.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidHost {
                host: host.to_string(),
                message: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Connect {
                host: trimmed.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/api", trimmed),
            host: trimmed.to_string(),
            token: token.to_string(),
        })
    }

    /// Invoke one remote method and return its raw JSON payload.
    ///
    /// Any non-200 HTTP status is a hard failure: 401 becomes
    /// [`ApiError::TokenNotCorrect`], everything else is carried as
    /// [`ApiError::Http`] for the classifier to inspect.
    pub async fn call(&self, method: &str, args: &[Value]) -> Result<Value, ApiError> {
        debug!(method, endpoint = %self.endpoint, "calling logseq api");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&ApiRequest { method, args })
            .send()
            .await
            .map_err(|e| ApiError::Connect {
                host: self.host.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::TokenNotCorrect);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        // Logseq answers 200 even for some in-band failures; surface those
        // as Remote so the typed clients can pattern-match the message.
        let payload: Value = response.json().await.map_err(|e| ApiError::Remote {
            message: format!("unparseable response body: {e}"),
        })?;
        if let Some(message) = payload.get("error").and_then(Value::as_str) {
            return Err(ApiError::Remote {
                message: message.to_string(),
            });
        }

        Ok(payload)
    }

    /// The normalized host this transport talks to.
    pub fn host(&self) -> &str {
        &self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_host() {
        let err = HttpTransport::new("not a url", "t", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidHost { .. }));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = HttpTransport::new("ftp://127.0.0.1", "t", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidHost { .. }));
    }

    #[test]
    fn test_normalizes_trailing_slash() {
        let transport =
            HttpTransport::new("http://127.0.0.1:12315/", "t", Duration::from_secs(1)).unwrap();
        assert_eq!(transport.host(), "http://127.0.0.1:12315");
    }
}
