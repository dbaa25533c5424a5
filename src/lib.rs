//! Logseq Bridge
//!
//! The core of a Logseq connector:
//! - HTTP client for the Logseq plugin API (file-based and database graphs)
//! - Search aggregation (free-text and cascading URL lookups)
//! - Block-content sanitization and markdown rendering
//! - Capture-template rendering for quick capture into the graph
//!
//! Every public service operation returns a [`StructuredResponse`] envelope;
//! callers branch on `status`/`msg`, never on a propagated error.

pub mod capture;
pub mod error;
pub mod logseq;
pub mod render;
pub mod response;
pub mod search;

use std::time::Duration;

pub use error::ApiError;
pub use logseq::{connect, GraphFlavor, LogseqApi};
pub use response::StructuredResponse;
pub use search::{SearchService, UrlSearchOptions};

// ============================================================================
// Runtime config (read-only; ownership of persisted settings lives with the
// host application)
// ============================================================================

/// Connection and capture configuration, resolved once per session.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Base URL of the Logseq HTTP API server (e.g. `http://127.0.0.1:12315`)
    pub host: String,
    /// Bearer token configured in Logseq's API server settings
    pub token: String,
    /// Per-request timeout applied by the transport
    pub request_timeout: Duration,
    /// Named capture templates configured by the user
    pub templates: Vec<CaptureTemplate>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "http://127.0.0.1:12315".to_string(),
            token: String::new(),
            request_timeout: Duration::from_secs(10),
            templates: vec![CaptureTemplate::default()],
        }
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `LOGSEQ_HOST` (default: `http://127.0.0.1:12315`) and
    /// `LOGSEQ_TOKEN` (default: empty).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("LOGSEQ_HOST").unwrap_or(defaults.host),
            token: std::env::var("LOGSEQ_TOKEN").unwrap_or(defaults.token),
            ..defaults
        }
    }
}

/// A user-authored capture template plus its target-location policy.
#[derive(Debug, Clone)]
pub struct CaptureTemplate {
    pub name: String,
    pub template: String,
    pub target: CaptureTarget,
}

/// Where a rendered capture is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureTarget {
    /// Today's journal page, named per the user's preferred date format
    Journal,
    /// The page currently open in Logseq
    CurrentPage,
    /// A fixed named page
    Page(String),
}

impl Default for CaptureTemplate {
    fn default() -> Self {
        Self {
            name: "quick-capture".to_string(),
            template: "**{{time}}** [[quick capture]]: {{content}}\
                       {{#if url}} [{{title}}]({{url}}){{/if}}"
                .to_string(),
            target: CaptureTarget::Journal,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
