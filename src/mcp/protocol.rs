//! MCP request parameters and result payloads exchanged with the diagram server
//!
//! Result types are deliberately lenient: unknown fields are ignored and optional
//! fields default, since the server's replies are only loosely schema-conformant.

use std::collections::BTreeMap;

use rust_mcp_sdk::schema::{Implementation, ProtocolVersion};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::errors::AgentError;

pub fn supported_protocol_version() -> String {
    ProtocolVersion::V2024_11_05.into()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    pub capabilities: Value,
    pub client_info: Implementation,
}

impl InitializeParams {
    pub fn new(client_name: &str, client_version: &str) -> Self {
        Self {
            protocol_version: supported_protocol_version(),
            capabilities: json!({
                "experimental": {},
                "sampling": {}
            }),
            client_info: Implementation {
                name: client_name.to_string(),
                version: client_version.to_string(),
                title: None,
                description: None,
                icons: vec![],
                website_url: None,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    #[serde(default)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub capabilities: Value,
    pub server_info: ServerInfo,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<TextContent>,
    #[serde(default)]
    pub is_error: Option<bool>,
}

impl CallToolResult {
    /// Text of the first content block, which carries the server's reply.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|content| content.text.as_str())
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextContent {
    #[serde(rename = "type", default = "text_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub text: String,
}

fn text_content_type() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadResourceParams {
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContent {
    pub uri: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub blob: Option<String>,
}

impl ResourceContent {
    /// Accepts a bare content object as well as the `{ "contents": [...] }` wrapper.
    pub fn from_result(result: Value) -> Result<Self, AgentError> {
        if let Some(contents) = result.get("contents") {
            let first = contents
                .as_array()
                .and_then(|items| items.first())
                .cloned()
                .ok_or_else(|| AgentError::unexpected("resources/read returned no contents"))?;
            return serde_json::from_value(first)
                .map_err(|err| AgentError::decode("resource content", err));
        }

        serde_json::from_value(result).map_err(|err| AgentError::decode("resource content", err))
    }

    pub fn require_text(&self) -> Result<&str, AgentError> {
        self.text
            .as_deref()
            .ok_or_else(|| AgentError::unexpected(format!("resource {} has no text", self.uri)))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetPromptParams {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetPromptResult {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub messages: Vec<PromptMessage>,
}

impl GetPromptResult {
    pub fn first_text(&self) -> Option<&str> {
        self.messages
            .first()
            .map(|message| message.content.text.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: TextContent,
}

/// Entry of a `tools/list`, `resources/list` or `prompts/list` reply.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ListingEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ListingEntry {
    pub fn label(&self) -> &str {
        self.uri
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("<unnamed>")
    }
}

pub fn parse_listing(result: &Value, key: &str) -> Result<Vec<ListingEntry>, AgentError> {
    let items = result
        .get(key)
        .cloned()
        .ok_or_else(|| AgentError::unexpected(format!("listing has no `{key}` field")))?;
    serde_json::from_value(items).map_err(|err| AgentError::decode("listing", err))
}

pub fn empty_object() -> Value {
    Value::Object(Map::new())
}
