//! Client variant for classic file-based graphs.

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use super::models::{parse_optional, parse_version};
use super::{is_unknown_method, GraphFlavor, LogseqApi, PageRef};
use crate::error::ApiError;
use crate::logseq::models::{Block, Graph, PageIdentity, RawSearchOutput, UserConfig};
use crate::logseq::transport::HttpTransport;

/// Typed wrappers over the file-graph method names of the plugin API.
#[derive(Clone)]
pub struct FileGraphClient {
    transport: HttpTransport,
}

impl FileGraphClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl LogseqApi for FileGraphClient {
    fn flavor(&self) -> GraphFlavor {
        GraphFlavor::File
    }

    async fn search(&self, query: &str) -> Result<RawSearchOutput, ApiError> {
        let payload = self
            .transport
            .call("logseq.App.search", &[json!(query)])
            .await
            .map_err(|err| {
                // A server that does not know the search method is a Logseq
                // older than the API this client targets.
                if is_unknown_method(&err) {
                    ApiError::IncompatibleVersion
                } else {
                    err
                }
            })?;
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
        parse_optional(payload)
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
        parse_optional(payload)
    }

    async fn append_block(&self, page: &str, content: &str) -> Result<Option<Block>, ApiError> {
        let payload = self
            .transport
            .call(
                "logseq.Editor.appendBlockInPage",
                &[json!(page), json!(content)],
            )
            .await?;
        parse_optional(payload)
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
        parse_optional(payload)
    }

    async fn get_version(&self) -> Result<String, ApiError> {
        let payload = self.transport.call("logseq.App.getInfo", &[]).await?;
        parse_version(payload)
    }
}
