//! The `StructuredResponse` envelope and the error classifier.
//!
//! `status == 200 && msg == "success"` is the success signature; any other
//! combination is a classified error. Service methods never return a bare
//! `Err` — client failures are funneled through [`classify`] so the caller
//! always receives an envelope.

use serde::Serialize;
use tracing::warn;

use crate::error::ApiError;

/// Success message carried by every successful envelope.
pub const MSG_SUCCESS: &str = "success";

const MSG_TOKEN: &str = "the authorization token does not match the Logseq API server";
const MSG_CONNECT: &str = "cannot connect with Logseq, check that the HTTP API server is running";
const MSG_VERSION: &str = "the Logseq version is lower than this operation requires";
const MSG_NOT_FOUND: &str = "no matching blocks or pages";
const MSG_UNKNOWN: &str = "unknown issue while talking to Logseq";

/// Uniform envelope returned by every public service operation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StructuredResponse<T> {
    pub status: u16,
    pub msg: String,
    pub response: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T> StructuredResponse<T> {
    /// A successful envelope around `response`.
    pub fn ok(response: T) -> Self {
        Self {
            status: 200,
            msg: MSG_SUCCESS.to_string(),
            response: Some(response),
            count: None,
        }
    }

    /// A successful envelope that also reports a result count.
    pub fn ok_with_count(response: T, count: usize) -> Self {
        Self {
            count: Some(count),
            ..Self::ok(response)
        }
    }

    /// A failed envelope with an explicit status and message.
    pub fn failed(status: u16, msg: impl Into<String>) -> Self {
        Self {
            status,
            msg: msg.into(),
            response: None,
            count: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200 && self.msg == MSG_SUCCESS
    }
}

/// Map a client error to its fixed envelope.
///
/// Pure and total: never panics, never re-raises. An in-band remote error or
/// an unexpected HTTP status falls through to the unknown bucket.
pub fn classify<T>(err: ApiError) -> StructuredResponse<T> {
    let envelope = match &err {
        ApiError::TokenNotCorrect => StructuredResponse::failed(401, MSG_TOKEN),
        ApiError::Http { status: 401, .. } => StructuredResponse::failed(401, MSG_TOKEN),
        ApiError::Connect { .. } | ApiError::InvalidHost { .. } => {
            StructuredResponse::failed(500, MSG_CONNECT)
        }
        ApiError::IncompatibleVersion => StructuredResponse::failed(400, MSG_VERSION),
        ApiError::EmptyResult => StructuredResponse::failed(404, MSG_NOT_FOUND),
        ApiError::Http { .. } | ApiError::Remote { .. } | ApiError::Decode(_) => {
            StructuredResponse::failed(500, MSG_UNKNOWN)
        }
    };
    if envelope.status != 404 {
        warn!(error = %err, status = envelope.status, "logseq api call failed");
    }
    envelope
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_signature() {
        let resp = StructuredResponse::ok(1);
        assert_eq!(resp.status, 200);
        assert_eq!(resp.msg, "success");
        assert!(resp.is_success());
    }

    #[test]
    fn test_token_error_maps_to_401() {
        let resp: StructuredResponse<()> = classify(ApiError::TokenNotCorrect);
        assert_eq!(resp.status, 401);
        assert!(resp.msg.contains("token"));
        assert!(resp.response.is_none());
    }

    #[test]
    fn test_connect_error_maps_to_500() {
        let resp: StructuredResponse<()> = classify(ApiError::Connect {
            host: "http://127.0.0.1:1".into(),
            message: "connection refused".into(),
        });
        assert_eq!(resp.status, 500);
        assert!(resp.msg.contains("connect"));
    }

    #[test]
    fn test_empty_result_maps_to_404() {
        let resp: StructuredResponse<()> = classify(ApiError::EmptyResult);
        assert_eq!(resp.status, 404);
    }

    #[test]
    fn test_version_error_maps_to_400() {
        let resp: StructuredResponse<()> = classify(ApiError::IncompatibleVersion);
        assert_eq!(resp.status, 400);
    }

    #[test]
    fn test_unclassified_http_falls_through_to_unknown() {
        let resp: StructuredResponse<()> = classify(ApiError::Http {
            status: 503,
            body: "busy".into(),
        });
        assert_eq!(resp.status, 500);
        assert!(resp.msg.contains("unknown"));
    }

    #[test]
    fn test_count_skipped_in_serialization_when_absent() {
        let json = serde_json::to_string(&StructuredResponse::ok(5)).unwrap();
        assert!(!json.contains("count"));
        let json = serde_json::to_string(&StructuredResponse::ok_with_count(5, 2)).unwrap();
        assert!(json.contains("\"count\":2"));
    }
}
