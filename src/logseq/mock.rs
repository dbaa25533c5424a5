//! In-memory mock implementation of `LogseqApi` for testing the service
//! layer without a running Logseq instance.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{RawSearchBlock, RawSearchOutput};
use super::{GraphFlavor, LogseqApi, PageRef};
use crate::error::ApiError;
use crate::logseq::models::{Block, Graph, PageIdentity, UserConfig};

/// Mock client backed by in-memory maps. Search answers are canned per exact
/// query string; every issued query and mutation is recorded for assertions.
pub(crate) struct MockLogseqApi {
    pub graph: Graph,
    pub version: String,
    pub user_config: UserConfig,
    pub current_page: Option<PageIdentity>,
    blocks: RwLock<HashMap<Uuid, Block>>,
    pages: RwLock<HashMap<String, PageIdentity>>,
    search_results: RwLock<HashMap<String, RawSearchOutput>>,
    queries: RwLock<Vec<String>>,
    updates: RwLock<Vec<(Uuid, String)>>,
    appends: RwLock<Vec<(String, String)>>,
}

impl MockLogseqApi {
    pub fn new() -> Self {
        Self {
            graph: Graph {
                name: "test-graph".to_string(),
                path: "/tmp/test-graph".to_string(),
            },
            version: "0.10.9".to_string(),
            user_config: UserConfig::default(),
            current_page: None,
            blocks: RwLock::new(HashMap::new()),
            pages: RwLock::new(HashMap::new()),
            search_results: RwLock::new(HashMap::new()),
            queries: RwLock::new(Vec::new()),
            updates: RwLock::new(Vec::new()),
            appends: RwLock::new(Vec::new()),
        }
    }

    /// Store a block so `get_block` can resolve it. Seeding happens before
    /// the service runs, so the lock is always uncontended here.
    pub fn seed_block(&self, block: Block) {
        self.blocks
            .try_write()
            .expect("seed while idle")
            .insert(block.uuid, block);
    }

    /// Store a page so `get_page` can resolve it by name.
    pub fn seed_page(&self, page: PageIdentity) {
        let name = page.name.clone().unwrap_or_default();
        self.pages
            .try_write()
            .expect("seed while idle")
            .insert(name, page);
    }

    /// Can a search answer for one exact query string.
    pub fn seed_search(&self, query: &str, block_uuids: &[Uuid], pages: &[&str]) {
        let output = RawSearchOutput {
            blocks: block_uuids
                .iter()
                .map(|uuid| RawSearchBlock {
                    uuid: *uuid,
                    content: String::new(),
                    page: None,
                })
                .collect(),
            pages: pages.iter().map(|p| p.to_string()).collect(),
        };
        self.search_results
            .try_write()
            .expect("seed while idle")
            .insert(query.to_string(), output);
    }

    /// Every query string `search` was called with, in order.
    pub async fn issued_queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }

    /// Every `(uuid, content)` pair pushed through `update_block`.
    pub async fn recorded_updates(&self) -> Vec<(Uuid, String)> {
        self.updates.read().await.clone()
    }

    /// Every `(page, content)` pair pushed through `append_block`.
    pub async fn recorded_appends(&self) -> Vec<(String, String)> {
        self.appends.read().await.clone()
    }
}

#[async_trait]
impl LogseqApi for MockLogseqApi {
    fn flavor(&self) -> GraphFlavor {
        GraphFlavor::File
    }

    async fn search(&self, query: &str) -> Result<RawSearchOutput, ApiError> {
        self.queries.write().await.push(query.to_string());
        match self.search_results.read().await.get(query) {
            Some(output) if !output.is_empty() => Ok(output.clone()),
            _ => Err(ApiError::EmptyResult),
        }
    }

    async fn get_page(&self, page: &PageRef) -> Result<Option<PageIdentity>, ApiError> {
        let pages = self.pages.read().await;
        Ok(match page {
            PageRef::Name(name) => pages.get(name).cloned(),
            PageRef::Id(id) => pages.values().find(|p| p.id == Some(*id)).cloned(),
            PageRef::Uuid(uuid) => pages.values().find(|p| p.uuid == Some(*uuid)).cloned(),
        })
    }

    async fn get_block(
        &self,
        uuid: &Uuid,
        _include_children: bool,
    ) -> Result<Option<Block>, ApiError> {
        Ok(self.blocks.read().await.get(uuid).cloned())
    }

    async fn append_block(&self, page: &str, content: &str) -> Result<Option<Block>, ApiError> {
        self.appends
            .write()
            .await
            .push((page.to_string(), content.to_string()));
        Ok(Some(Block {
            uuid: Uuid::new_v4(),
            content: content.to_string(),
            html: String::new(),
            page: PageIdentity::named(page),
            format: Default::default(),
            marker: None,
            priority: None,
        }))
    }

    async fn update_block(&self, uuid: &Uuid, content: &str) -> Result<(), ApiError> {
        self.updates.write().await.push((*uuid, content.to_string()));
        if let Some(block) = self.blocks.write().await.get_mut(uuid) {
            block.content = content.to_string();
        }
        Ok(())
    }

    async fn get_user_config(&self) -> Result<UserConfig, ApiError> {
        Ok(self.user_config.clone())
    }

    async fn get_current_graph(&self) -> Result<Graph, ApiError> {
        Ok(self.graph.clone())
    }

    async fn get_current_page(&self) -> Result<Option<PageIdentity>, ApiError> {
        Ok(self.current_page.clone())
    }

    async fn get_version(&self) -> Result<String, ApiError> {
        Ok(self.version.clone())
    }
}
