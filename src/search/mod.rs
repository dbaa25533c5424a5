//! Result aggregation service.
//!
//! Turns one user query into one deduplicated, rendered [`SearchResult`] and
//! implements the two retrieval strategies (free-text and cascading URL
//! lookup) plus the mutation flows (marker change, quick capture). Every
//! public method funnels client failures through the classifier and returns
//! a [`StructuredResponse`] — never a bare error.

pub mod models;

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;
use uuid::Uuid;

use crate::capture::{format_logseq_date, CaptureInput, CaptureRenderer};
use crate::error::ApiError;
use crate::logseq::models::{Block, PageIdentity, RawSearchBlock, RawSearchOutput};
use crate::logseq::{self, LogseqApi, PageRef, MIN_SEARCH_VERSION};
use crate::render::{clean_block_content, ContentRenderer};
use crate::response::{classify, StructuredResponse};
use crate::{BridgeConfig, CaptureTarget, CaptureTemplate};

pub use models::{ConnectionInfo, SearchResult, UrlSearchOptions};

/// Orchestrates client calls, dedup, and rendering.
pub struct SearchService {
    api: Arc<dyn LogseqApi>,
    renderer: ContentRenderer,
    capture_renderer: CaptureRenderer,
}

impl SearchService {
    pub fn new(api: Arc<dyn LogseqApi>) -> Self {
        Self {
            api,
            renderer: ContentRenderer::new(),
            capture_renderer: CaptureRenderer::new(),
        }
    }

    /// Probe the server once and build a service over the matching client
    /// variant.
    pub async fn connect(config: &BridgeConfig) -> Result<Self, ApiError> {
        Ok(Self::new(logseq::connect(config).await?))
    }

    // ========================================================================
    // Free-text search
    // ========================================================================

    /// Search the active graph, resolving and rendering every hit. The query
    /// term is highlighted in the rendered HTML.
    pub async fn search(&self, query: &str) -> StructuredResponse<SearchResult> {
        match self.search_inner(query).await {
            Ok(result) => StructuredResponse::ok(result),
            Err(err) => classify(err),
        }
    }

    async fn search_inner(&self, query: &str) -> Result<SearchResult, ApiError> {
        let graph = self.api.get_current_graph().await?;
        let raw = self.api.search(query).await?;
        let blocks = self
            .resolve_blocks(&raw.blocks, &graph.name, Some(query))
            .await?;
        let pages = self.resolve_pages(&raw.pages).await?;
        Ok(SearchResult {
            blocks,
            pages,
            graph: graph.name,
            count: None,
        })
    }

    // ========================================================================
    // URL search
    // ========================================================================

    /// Cascading lookup for a browsed URL: `host+path+search+hash`, then
    /// `host+path+search`, then `host+path`, stopping at the first level that
    /// yields results. With `fuzzy`, one broader host-only query follows —
    /// merged into the result but excluded from `count`, which is frozen at
    /// the pre-fuzzy unique-block total.
    pub async fn url_search(
        &self,
        url: &str,
        opt: UrlSearchOptions,
    ) -> StructuredResponse<SearchResult> {
        match self.url_search_inner(url, opt).await {
            Ok(result) => {
                let count = result.count.unwrap_or(0);
                StructuredResponse::ok_with_count(result, count)
            }
            Err(err) => classify(err),
        }
    }

    async fn url_search_inner(
        &self,
        url: &str,
        opt: UrlSearchOptions,
    ) -> Result<SearchResult, ApiError> {
        let graph = self.api.get_current_graph().await?;
        let (host, levels) = cascade_levels(url)?;

        // Dedup state scoped to this call only.
        let mut merged = MergedHits::default();
        let mut queried: Vec<String> = Vec::new();

        for level in &levels {
            queried.push(level.clone());
            match self.api.search(level).await {
                Ok(output) => {
                    merged.absorb(output);
                    break;
                }
                Err(err) if err.is_empty_result() => continue,
                Err(err) => return Err(err),
            }
        }

        // Frozen before the fuzzy pass; the badge the caller shows depends
        // on this staying put.
        let count = merged.blocks.len();

        if opt.fuzzy && !queried.iter().any(|q| q == &host) {
            debug!(%host, "issuing fuzzy host-only query");
            if let Ok(output) = self.api.search(&host).await {
                merged.absorb(output);
            }
        }

        if merged.blocks.is_empty() && merged.pages.is_empty() {
            return Err(ApiError::EmptyResult);
        }

        let blocks = self.resolve_blocks(&merged.blocks, &graph.name, None).await?;
        let pages = self.resolve_pages(&merged.pages).await?;
        Ok(SearchResult {
            blocks,
            pages,
            graph: graph.name,
            count: Some(count),
        })
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Swap a block's workflow marker (e.g. TODO → DOING).
    ///
    /// Blocks carrying a `SCHEDULED:` annotation are rejected. The swap is a
    /// best-effort text substitution of the first occurrence of the current
    /// marker token; a coincidental earlier occurrence of the same token in
    /// the content would be replaced instead.
    pub async fn change_block_marker(
        &self,
        uuid: &Uuid,
        marker: &str,
    ) -> StructuredResponse<()> {
        let block = match self.api.get_block(uuid, false).await {
            Ok(Some(block)) => block,
            Ok(None) => return classify(ApiError::EmptyResult),
            Err(err) => return classify(err),
        };
        if block.content.contains("SCHEDULED:") {
            return StructuredResponse::failed(
                400,
                "the block is scheduled; markers on scheduled blocks cannot be changed",
            );
        }
        let updated = match &block.marker {
            Some(current) => block.content.replacen(current.as_str(), marker, 1),
            None => format!("{marker} {}", block.content),
        };
        match self.api.update_block(uuid, &updated).await {
            Ok(()) => StructuredResponse::ok(()),
            Err(err) => classify(err),
        }
    }

    /// Render a capture template and append the result per its target
    /// policy: today's journal, the currently open page, or a named page.
    pub async fn capture(
        &self,
        template: &CaptureTemplate,
        input: &CaptureInput,
    ) -> StructuredResponse<String> {
        self.capture_at(template, input, chrono::Local::now().naive_local())
            .await
    }

    async fn capture_at(
        &self,
        template: &CaptureTemplate,
        input: &CaptureInput,
        at: chrono::NaiveDateTime,
    ) -> StructuredResponse<String> {
        let config = match self.api.get_user_config().await {
            Ok(config) => config,
            Err(err) => return classify(err),
        };
        let rendered = match self.capture_renderer.render(
            &template.template,
            input,
            &at,
            &config.preferred_date_format,
        ) {
            Ok(rendered) => rendered,
            Err(err) => {
                return StructuredResponse::failed(400, format!("invalid capture template: {err}"))
            }
        };
        let page = match &template.target {
            CaptureTarget::Journal => format_logseq_date(&at, &config.preferred_date_format),
            CaptureTarget::Page(name) => name.clone(),
            CaptureTarget::CurrentPage => match self.api.get_current_page().await {
                Ok(Some(page)) => match page.display_name() {
                    Some(name) => name.to_string(),
                    None => return StructuredResponse::failed(400, "the current page has no name"),
                },
                Ok(None) => return StructuredResponse::failed(400, "no page is currently open"),
                Err(err) => return classify(err),
            },
        };
        match self.api.append_block(&page, &rendered).await {
            Ok(_) => StructuredResponse::ok(rendered),
            Err(err) => classify(err),
        }
    }

    // ========================================================================
    // Connection probe
    // ========================================================================

    /// Fetch version and active graph in one go — the options page uses this
    /// as its "test connection" flow.
    pub async fn probe_connection(&self) -> StructuredResponse<ConnectionInfo> {
        let probe = async {
            let version = self.api.get_version().await?;
            if logseq::version_compare(&version, MIN_SEARCH_VERSION) == Ordering::Less {
                return Err(ApiError::IncompatibleVersion);
            }
            let graph = self.api.get_current_graph().await?;
            Ok(ConnectionInfo {
                graph: graph.name,
                version,
            })
        };
        match probe.await {
            Ok(info) => StructuredResponse::ok(info),
            Err(err) => classify(err),
        }
    }

    // ========================================================================
    // Resolution helpers
    // ========================================================================

    /// Fetch full blocks for the given stubs concurrently and render each.
    /// Output order follows the stub list, not completion order. Duplicate
    /// uuids are dropped (first occurrence wins); blocks deleted between
    /// search and fetch are skipped.
    async fn resolve_blocks(
        &self,
        stubs: &[RawSearchBlock],
        graph: &str,
        query: Option<&str>,
    ) -> Result<Vec<Block>, ApiError> {
        let mut seen = HashSet::new();
        let unique: Vec<&RawSearchBlock> =
            stubs.iter().filter(|stub| seen.insert(stub.uuid)).collect();
        let fetched = try_join_all(
            unique
                .iter()
                .map(|stub| self.api.get_block(&stub.uuid, false)),
        )
        .await?;
        Ok(fetched
            .into_iter()
            .flatten()
            .map(|block| self.render_block(block, graph, query))
            .collect())
    }

    fn render_block(&self, mut block: Block, graph: &str, query: Option<&str>) -> Block {
        let cleaned = clean_block_content(
            &block.content,
            block.marker.as_deref(),
            block.priority.as_deref(),
        );
        block.html = self.renderer.render(&cleaned, graph, query);
        block
    }

    /// Resolve page names to full identities concurrently. Names the server
    /// no longer knows stay as name-only identities.
    async fn resolve_pages(&self, names: &[String]) -> Result<Vec<PageIdentity>, ApiError> {
        let refs: Vec<PageRef> = names.iter().map(|name| PageRef::Name(name.clone())).collect();
        let fetched = try_join_all(refs.iter().map(|page| self.api.get_page(page))).await?;
        Ok(fetched
            .into_iter()
            .zip(names)
            .map(|(found, name)| found.unwrap_or_else(|| PageIdentity::named(name.as_str())))
            .collect())
    }
}

/// Merge buffer for the URL-search cascade: first occurrence of a block uuid
/// or page name wins, later duplicates are silently dropped.
#[derive(Default)]
struct MergedHits {
    blocks: Vec<RawSearchBlock>,
    pages: Vec<String>,
    seen_blocks: HashSet<Uuid>,
    seen_pages: HashSet<String>,
}

impl MergedHits {
    fn absorb(&mut self, output: RawSearchOutput) {
        for block in output.blocks {
            if self.seen_blocks.insert(block.uuid) {
                self.blocks.push(block);
            }
        }
        for page in output.pages {
            if self.seen_pages.insert(page.clone()) {
                self.pages.push(page);
            }
        }
    }
}

/// Decompose a URL into its cascade of decreasingly specific queries, most
/// specific first, plus the bare host for the fuzzy pass.
fn cascade_levels(url: &str) -> Result<(String, Vec<String>), ApiError> {
    let parsed = reqwest::Url::parse(url).map_err(|err| ApiError::InvalidHost {
        host: url.to_string(),
        message: err.to_string(),
    })?;
    let host = match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => {
            return Err(ApiError::InvalidHost {
                host: url.to_string(),
                message: "missing host".to_string(),
            })
        }
    };
    let base = format!("{}{}", host, parsed.path().trim_end_matches('/'));
    let with_query = match parsed.query() {
        Some(query) if !query.is_empty() => format!("{base}?{query}"),
        _ => base.clone(),
    };
    let with_fragment = match parsed.fragment() {
        Some(fragment) if !fragment.is_empty() => format!("{with_query}#{fragment}"),
        _ => with_query.clone(),
    };

    let mut levels = Vec::new();
    for level in [with_fragment, with_query, base] {
        if !levels.contains(&level) {
            levels.push(level);
        }
    }
    Ok((host, levels))
}
