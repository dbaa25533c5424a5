//! Service-level result models.

use serde::Serialize;

use crate::logseq::models::{Block, PageIdentity};

/// The deduplicated, rendered result of one search operation.
///
/// Invariant: `blocks` never contains two entries with the same uuid — the
/// aggregation step enforces this, the remote server does not.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResult {
    pub blocks: Vec<Block>,
    pub pages: Vec<PageIdentity>,
    pub graph: String,
    /// For URL search: unique blocks found before the fuzzy pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

/// Options for [`SearchService::url_search`](crate::search::SearchService::url_search).
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlSearchOptions {
    /// Follow the path-level queries with one broader host-only query
    pub fuzzy: bool,
}

/// What a connection probe reports back to the host shell.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConnectionInfo {
    pub graph: String,
    pub version: String,
}
