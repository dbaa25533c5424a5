//! Client-layer error type.
//!
//! Every failure mode of the Logseq API client is represented as data here,
//! so the service layer can pattern-match and classify it into a
//! [`StructuredResponse`](crate::response::StructuredResponse) instead of
//! propagating an opaque error to callers.

use thiserror::Error;

/// Discriminated failure of a Logseq API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API server rejected the bearer token (HTTP 401).
    #[error("the authorization token was rejected by the Logseq API server")]
    TokenNotCorrect,

    /// The server could not be reached at all.
    #[error("cannot connect with Logseq at {host}: {message}")]
    Connect { host: String, message: String },

    /// The configured host is not a valid URL.
    #[error("invalid Logseq host {host:?}: {message}")]
    InvalidHost { host: String, message: String },

    /// The remote Logseq is too old to support the requested operation.
    #[error("the Logseq version is lower than this operation requires")]
    IncompatibleVersion,

    /// A query legitimately produced no blocks and no pages.
    #[error("the query matched no blocks or pages")]
    EmptyResult,

    /// HTTP-level failure other than 401. Carries the raw body so the
    /// classifier can inspect it.
    #[error("the Logseq API returned HTTP {status}")]
    Http { status: u16, body: String },

    /// The server answered 200 but the payload itself reports an error.
    #[error("the Logseq API reported an error: {message}")]
    Remote { message: String },

    /// The response body did not match the expected shape.
    #[error("unexpected response shape from the Logseq API")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether this error means "nothing found" rather than a real failure.
    /// The URL-search cascade keeps probing broader queries on these.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, ApiError::EmptyResult)
    }
}
