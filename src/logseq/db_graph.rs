//! Client variant for database-backed graphs.
//!
//! Same capability set as the file variant; only the search method name and
//! the nested entity wrappers in page/block payloads differ. Downstream code
//! never sees the difference.

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use super::models::{parse_optional, parse_version};
use super::{GraphFlavor, LogseqApi, PageRef};
use crate::error::ApiError;
use crate::logseq::models::{Block, Graph, PageIdentity, RawSearchOutput, UserConfig};
use crate::logseq::transport::HttpTransport;

/// Typed wrappers over the db-graph method names of the plugin API.
#[derive(Clone)]
pub struct DbGraphClient {
    transport: HttpTransport,
}

impl DbGraphClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

/// DB graphs wrap entity payloads one level deep (`{"page": {...}}`,
/// `{"block": {...}}`); peel the wrapper when present so both variants hand
/// the same shapes downstream.
fn unwrap_entity(value: Value, key: &str) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key(key) => {
            map.remove(key).unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[async_trait]
impl LogseqApi for DbGraphClient {
    fn flavor(&self) -> GraphFlavor {
        GraphFlavor::Db
    }

    async fn search(&self, query: &str) -> Result<RawSearchOutput, ApiError> {
        let payload = self
            .transport
            .call("logseq.DB.search", &[json!(query)])
            .await?;
        let output: RawSearchOutput = serde_json::from_value(payload)?;
        if output.is_empty() {
            return Err(ApiError::EmptyResult);
        }
        Ok(output)
    }

    async fn get_page(&self, page: &PageRef) -> Result<Option<PageIdentity>, ApiError> {
        let payload = self
            .transport
            .call("logseq.Editor.getPage", &[page.to_arg()])
            .await?;
        parse_optional(unwrap_entity(payload, "page"))
    }

    async fn get_block(
        &self,
        uuid: &Uuid,
        include_children: bool,
    ) -> Result<Option<Block>, ApiError> {
        let payload = self
            .transport
            .call(
                "logseq.Editor.getBlock",
                &[
                    json!(uuid.to_string()),
                    json!({ "includeChildren": include_children }),
                ],
            )
            .await?;
        parse_optional(unwrap_entity(payload, "block"))
    }

    async fn append_block(&self, page: &str, content: &str) -> Result<Option<Block>, ApiError> {
        let payload = self
            .transport
            .call(
                "logseq.Editor.appendBlockInPage",
                &[json!(page), json!(content)],
            )
            .await?;
        parse_optional(unwrap_entity(payload, "block"))
    }

    async fn update_block(&self, uuid: &Uuid, content: &str) -> Result<(), ApiError> {
        self.transport
            .call(
                "logseq.Editor.updateBlock",
                &[json!(uuid.to_string()), json!(content)],
            )
            .await?;
        Ok(())
    }

    async fn get_user_config(&self) -> Result<UserConfig, ApiError> {
        let payload = self
            .transport
            .call("logseq.App.getUserConfigs", &[])
            .await?;
        Ok(serde_json::from_value(payload)?)
    }

    async fn get_current_graph(&self) -> Result<Graph, ApiError> {
        let payload = self
            .transport
            .call("logseq.App.getCurrentGraph", &[])
            .await?;
        Ok(serde_json::from_value(payload)?)
    }

    async fn get_current_page(&self) -> Result<Option<PageIdentity>, ApiError> {
        let payload = self
            .transport
            .call("logseq.Editor.getCurrentPage", &[])
            .await?;
        parse_optional(unwrap_entity(payload, "page"))
    }

    async fn get_version(&self) -> Result<String, ApiError> {
        let payload = self.transport.call("logseq.App.getInfo", &[]).await?;
        parse_version(payload)
    }
}
