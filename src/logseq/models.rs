//! Wire models for the Logseq plugin API.
//!
//! Field names follow Logseq's JSON: entity payloads are camelCase, search
//! payloads use EDN-flavored `block/...` keys. Unknown fields are ignored so
//! minor server-side additions don't break deserialization.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A page referenced by any one of its identifying fields.
///
/// Resolution to a canonical form happens server-side; the core only
/// guarantees that anything it constructs itself carries at least one of
/// `id`/`uuid`/`name` (see [`PageIdentity::is_identified`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageIdentity {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub uuid: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
}

impl PageIdentity {
    /// A page identity known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// True when at least one identifying field is present.
    pub fn is_identified(&self) -> bool {
        self.id.is_some() || self.uuid.is_some() || self.name.is_some()
    }

    /// Display name, preferring the original (un-normalized) page name.
    pub fn display_name(&self) -> Option<&str> {
        self.original_name.as_deref().or(self.name.as_deref())
    }
}

/// Source format of a block's raw content.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlockFormat {
    #[default]
    Markdown,
    Org,
}

/// The atomic unit of Logseq content.
///
/// `html` is always derived from `content` by the render pipeline and is
/// never edited directly; mutations go through `content` and a re-render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    pub uuid: Uuid,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub page: PageIdentity,
    #[serde(default)]
    pub format: BlockFormat,
    #[serde(default)]
    pub marker: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

/// The active knowledge base. Fetched fresh per operation — the user may
/// switch graphs in Logseq at any time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Graph {
    pub name: String,
    #[serde(default)]
    pub path: String,
}

/// The slice of Logseq's user configuration the core reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserConfig {
    pub preferred_date_format: String,
    #[serde(default)]
    pub preferred_format: Option<String>,
    #[serde(default)]
    pub preferred_todo: Option<String>,
    #[serde(default)]
    pub preferred_language: Option<String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            preferred_date_format: "MMM do, yyyy".to_string(),
            preferred_format: None,
            preferred_todo: None,
            preferred_language: None,
        }
    }
}

/// Raw free-text search payload: block stubs plus bare page names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchOutput {
    #[serde(default)]
    pub blocks: Vec<RawSearchBlock>,
    #[serde(default)]
    pub pages: Vec<String>,
}

impl RawSearchOutput {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.pages.is_empty()
    }
}

/// A block as it appears in search results: uuid and a content snippet only.
/// Full content and page identity come from a follow-up `get_block`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSearchBlock {
    #[serde(rename = "block/uuid")]
    pub uuid: Uuid,
    #[serde(rename = "block/content", default)]
    pub content: String,
    #[serde(rename = "block/page", default)]
    pub page: Option<serde_json::Value>,
}

/// Application info as reported by `getInfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppInfo {
    pub version: String,
}

/// Deserialize a payload that is `null` when the entity does not exist.
pub(crate) fn parse_optional<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
) -> Result<Option<T>, crate::error::ApiError> {
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}

/// Extract the version string from a `getInfo` payload. Older servers answer
/// a bare string, newer ones an object with a `version` field.
pub(crate) fn parse_version(value: serde_json::Value) -> Result<String, crate::error::ApiError> {
    if let Some(version) = value.as_str() {
        return Ok(version.to_string());
    }
    let info: AppInfo = serde_json::from_value(value)?;
    Ok(info.version)
}
