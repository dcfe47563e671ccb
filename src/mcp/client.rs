//! The MCP agent: a thin, sequential JSON-RPC client for an MCP-GLSP server
//!
//! Every call allocates the next request id, posts one envelope and decodes the
//! reply. Tool, resource and prompt calls are refused until [`McpAgent::initialize`]
//! has completed the handshake.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, OnceLock,
    },
    time::Instant,
};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    config::Config,
    domain::tools::ToolArguments,
    errors::AgentError,
    logging::{log_exchange, Exchange},
    mcp::{
        protocol::{
            empty_object, parse_listing, CallToolParams, CallToolResult, GetPromptParams,
            GetPromptResult, InitializeParams, InitializeResult, ListingEntry, ReadResourceParams,
            ResourceContent,
        },
        rpc::{json_rpc_request, parse_json_rpc_response},
    },
    transport::{HttpTransport, RpcTransport},
};

pub struct McpAgent {
    transport: Arc<dyn RpcTransport>,
    client_name: String,
    client_version: String,
    request_id: AtomicU64,
    initialized: AtomicBool,
    session_id: OnceLock<String>,
}

impl McpAgent {
    pub fn new(
        transport: Arc<dyn RpcTransport>,
        client_name: impl Into<String>,
        client_version: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            client_name: client_name.into(),
            client_version: client_version.into(),
            request_id: AtomicU64::new(0),
            initialized: AtomicBool::new(false),
            session_id: OnceLock::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, AgentError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(
            Arc::new(transport),
            config.client_name.clone(),
            config.client_version.clone(),
        ))
    }

    pub fn server_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Number of requests sent so far, which is also the last id used.
    pub fn requests_sent(&self) -> u64 {
        self.request_id.load(Ordering::SeqCst)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.get().map(String::as_str)
    }

    pub async fn send_request(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, AgentError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst) + 1;
        let payload = json_rpc_request(id, method, params.as_ref());
        let started_at = Instant::now();

        let outcome = self.exchange(&payload, id).await;

        let (status, success) = match &outcome {
            Ok(_) => (Some(200), true),
            Err(AgentError::Http { status, .. }) => (Some(*status), false),
            Err(AgentError::Rpc { .. }) => (Some(200), false),
            Err(_) => (None, false),
        };
        log_exchange(&Exchange {
            method,
            id: Some(id),
            params: params.as_ref(),
            status,
            elapsed: started_at.elapsed(),
            success,
        });

        outcome
    }

    async fn exchange(&self, payload: &Value, id: u64) -> Result<Value, AgentError> {
        let response = self.transport.post_json(payload, self.session_id()).await?;

        if response.status != 200 {
            return Err(AgentError::Http {
                status: response.status,
                body: response.body,
            });
        }

        parse_json_rpc_response(&response.body, id)
    }

    pub async fn initialize(&self) -> Result<InitializeResult, AgentError> {
        info!(server = %self.server_url(), "initializing agent connection to MCP-GLSP server");

        let params = InitializeParams::new(&self.client_name, &self.client_version);
        let result = self
            .send_request("initialize", Some(to_params(&params)?))
            .await?;
        let result: InitializeResult = serde_json::from_value(result)
            .map_err(|err| AgentError::decode("initialize result", err))?;

        if let Some(session_id) = result.session_id.as_ref() {
            let _ = self.session_id.set(session_id.clone());
        }

        info!(
            server_name = %result.server_info.name,
            server_version = %result.server_info.version,
            protocol_version = result.protocol_version.as_deref().unwrap_or("unknown"),
            "connected to {} v{}",
            result.server_info.name,
            result.server_info.version
        );

        self.send_request("initialized", Some(empty_object())).await?;
        self.initialized.store(true, Ordering::SeqCst);

        Ok(result)
    }

    fn ensure_initialized(&self) -> Result<(), AgentError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(AgentError::NotInitialized)
        }
    }

    pub async fn call_tool(
        &self,
        tool_name: &str,
        arguments: Value,
    ) -> Result<CallToolResult, AgentError> {
        self.ensure_initialized()?;

        let params = CallToolParams {
            name: tool_name.to_string(),
            arguments,
        };
        let result = self
            .send_request("tools/call", Some(to_params(&params)?))
            .await?;
        let result: CallToolResult = serde_json::from_value(result)
            .map_err(|err| AgentError::decode("tool result", err))?;

        if result.is_error() {
            return Err(AgentError::ToolFailed {
                tool: tool_name.to_string(),
                message: result.first_text().unwrap_or("unknown error").to_string(),
            });
        }

        debug!(tool = tool_name, reply = result.first_text().unwrap_or(""), "tool call completed");
        Ok(result)
    }

    pub async fn invoke<T: ToolArguments + Sync>(
        &self,
        arguments: &T,
    ) -> Result<CallToolResult, AgentError> {
        self.call_tool(T::TOOL, arguments.to_arguments()?).await
    }

    pub async fn read_resource(&self, uri: &str) -> Result<ResourceContent, AgentError> {
        self.ensure_initialized()?;

        let params = ReadResourceParams {
            uri: uri.to_string(),
        };
        let result = self
            .send_request("resources/read", Some(to_params(&params)?))
            .await?;
        ResourceContent::from_result(result)
    }

    pub async fn get_prompt(
        &self,
        prompt_name: &str,
        arguments: BTreeMap<String, String>,
    ) -> Result<GetPromptResult, AgentError> {
        self.ensure_initialized()?;

        let params = GetPromptParams {
            name: prompt_name.to_string(),
            arguments: (!arguments.is_empty()).then_some(arguments),
        };
        let result = self
            .send_request("prompts/get", Some(to_params(&params)?))
            .await?;
        serde_json::from_value(result).map_err(|err| AgentError::decode("prompt result", err))
    }

    pub async fn list_tools(&self) -> Result<Vec<ListingEntry>, AgentError> {
        self.list("tools/list", "tools").await
    }

    pub async fn list_resources(&self) -> Result<Vec<ListingEntry>, AgentError> {
        self.list("resources/list", "resources").await
    }

    pub async fn list_prompts(&self) -> Result<Vec<ListingEntry>, AgentError> {
        self.list("prompts/list", "prompts").await
    }

    async fn list(&self, method: &str, key: &str) -> Result<Vec<ListingEntry>, AgentError> {
        self.ensure_initialized()?;
        let result = self.send_request(method, None).await?;
        parse_listing(&result, key)
    }

    /// True when the health endpoint answers 200. Connection failures and
    /// timeouts are errors so callers can tell "down" from "unhealthy".
    pub async fn health_check(&self) -> Result<bool, AgentError> {
        let status = self.transport.get_health().await?;
        debug!(status, "health check completed");
        Ok(status == 200)
    }
}

fn to_params<T: Serialize>(params: &T) -> Result<Value, AgentError> {
    serde_json::to_value(params).map_err(|err| AgentError::decode("request params", err))
}
