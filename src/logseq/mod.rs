//! Logseq plugin API client.
//!
//! Two client variants exist — [`FileGraphClient`] for classic file-based
//! graphs and [`DbGraphClient`] for the newer database representation —
//! polymorphic over the same [`LogseqApi`] capability set. Callers select a
//! variant once per session via [`connect`], which probes the server's
//! db-graph capability; downstream code treats the two as interchangeable.

pub mod models;
pub mod transport;

mod db_graph;
mod file_graph;

#[cfg(test)]
pub(crate) mod mock;

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::BridgeConfig;

pub use db_graph::DbGraphClient;
pub use file_graph::FileGraphClient;
pub use models::{Block, Graph, PageIdentity, RawSearchOutput, UserConfig};
pub use transport::HttpTransport;

/// Oldest Logseq version whose API server exposes the search endpoint.
pub const MIN_SEARCH_VERSION: &str = "0.8.18";

/// Which graph representation the remote Logseq is serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFlavor {
    /// Classic file-based graph
    File,
    /// Database-backed graph
    Db,
}

/// A page reference by any one of its identifying fields; the server resolves
/// whichever is given to the canonical page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageRef {
    Name(String),
    Id(i64),
    Uuid(Uuid),
}

impl PageRef {
    /// The JSON argument Logseq expects for page lookups.
    pub(crate) fn to_arg(&self) -> Value {
        match self {
            PageRef::Name(name) => Value::String(name.clone()),
            PageRef::Id(id) => Value::from(*id),
            PageRef::Uuid(uuid) => Value::String(uuid.to_string()),
        }
    }
}

impl From<&str> for PageRef {
    fn from(name: &str) -> Self {
        PageRef::Name(name.to_string())
    }
}

/// Capability set shared by both client variants.
#[async_trait]
pub trait LogseqApi: Send + Sync {
    /// Which variant this client is; fixed for the session.
    fn flavor(&self) -> GraphFlavor;

    /// Free-text search across the active graph.
    async fn search(&self, query: &str) -> Result<RawSearchOutput, ApiError>;

    /// Look a page up by name, id, or uuid. `None` when the page is missing.
    async fn get_page(&self, page: &PageRef) -> Result<Option<PageIdentity>, ApiError>;

    /// Fetch a block by uuid, optionally with its children inlined.
    async fn get_block(
        &self,
        uuid: &Uuid,
        include_children: bool,
    ) -> Result<Option<Block>, ApiError>;

    /// Append a new block to the named page. Returns the created block when
    /// the server echoes it back.
    async fn append_block(&self, page: &str, content: &str) -> Result<Option<Block>, ApiError>;

    /// Replace a block's raw content.
    async fn update_block(&self, uuid: &Uuid, content: &str) -> Result<(), ApiError>;

    /// The user's Logseq configuration (date format, preferred markup, ...).
    async fn get_user_config(&self) -> Result<UserConfig, ApiError>;

    /// The currently active graph. Never cached — the user may switch graphs
    /// at any time.
    async fn get_current_graph(&self) -> Result<Graph, ApiError>;

    /// The page currently open in the Logseq UI, if any.
    async fn get_current_page(&self) -> Result<Option<PageIdentity>, ApiError>;

    /// The remote application version, e.g. `"0.10.9"`.
    async fn get_version(&self) -> Result<String, ApiError>;
}

/// Build a transport, probe the db-graph capability once, and return the
/// matching client variant. An older Logseq that does not know the probe
/// method is a file graph by definition.
pub async fn connect(config: &BridgeConfig) -> Result<Arc<dyn LogseqApi>, ApiError> {
    let transport = HttpTransport::new(&config.host, &config.token, config.request_timeout)?;
    let flavor = probe_flavor(&transport).await?;
    debug!(?flavor, host = transport.host(), "selected logseq client variant");
    Ok(match flavor {
        GraphFlavor::Db => Arc::new(DbGraphClient::new(transport)),
        GraphFlavor::File => Arc::new(FileGraphClient::new(transport)),
    })
}

async fn probe_flavor(transport: &HttpTransport) -> Result<GraphFlavor, ApiError> {
    match transport.call("logseq.App.checkCurrentIsDbGraph", &[]).await {
        Ok(value) => Ok(if value.as_bool().unwrap_or(false) {
            GraphFlavor::Db
        } else {
            GraphFlavor::File
        }),
        Err(err) if is_unknown_method(&err) => Ok(GraphFlavor::File),
        Err(err) => Err(err),
    }
}

/// Dotted-numeric version comparison: `"1.10.18" < "1.10.19"`. Non-numeric
/// suffixes within a segment are ignored, missing segments compare as zero.
pub fn version_compare(a: &str, b: &str) -> Ordering {
    let a = numeric_segments(a);
    let b = numeric_segments(b);
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn numeric_segments(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}

/// Whether an error is the server saying it does not know the method — the
/// signature of an older Logseq behind the API.
pub(crate) fn is_unknown_method(err: &ApiError) -> bool {
    let text = match err {
        ApiError::Remote { message } => message.as_str(),
        ApiError::Http { body, .. } => body.as_str(),
        _ => return false,
    };
    let lower = text.to_lowercase();
    lower.contains("method")
        && (lower.contains("not exist") || lower.contains("unknown") || lower.contains("invalid"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_compare_orders_numerically() {
        assert_eq!(version_compare("1.10.18", "1.10.19"), Ordering::Less);
        assert_eq!(version_compare("1.10.19", "1.10.19"), Ordering::Equal);
        assert_eq!(version_compare("0.10.9", "0.9.20"), Ordering::Greater);
    }

    #[test]
    fn test_version_compare_handles_uneven_lengths_and_suffixes() {
        assert_eq!(version_compare("1.10", "1.10.0"), Ordering::Equal);
        assert_eq!(version_compare("0.10.9-alpha", "0.10.9"), Ordering::Equal);
        assert_eq!(version_compare("0.10.9", "0.10.10"), Ordering::Less);
    }

    #[test]
    fn test_page_ref_args() {
        assert_eq!(PageRef::from("Projects").to_arg(), Value::from("Projects"));
        assert_eq!(PageRef::Id(42).to_arg(), Value::from(42));
        let uuid: Uuid = "6f93f1f1-3b3a-4a9b-8a43-6c1f2c8f0001".parse().unwrap();
        assert_eq!(
            PageRef::Uuid(uuid).to_arg(),
            Value::from("6f93f1f1-3b3a-4a9b-8a43-6c1f2c8f0001")
        );
    }

    #[test]
    fn test_unknown_method_detection() {
        assert!(is_unknown_method(&ApiError::Remote {
            message: "Not existed method logseq.App.checkCurrentIsDbGraph".into()
        }));
        assert!(is_unknown_method(&ApiError::Http {
            status: 400,
            body: "unknown method".into()
        }));
        assert!(!is_unknown_method(&ApiError::TokenNotCorrect));
        assert!(!is_unknown_method(&ApiError::Remote {
            message: "graph is locked".into()
        }));
    }
}
