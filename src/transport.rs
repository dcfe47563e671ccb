use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;

use crate::{config::Config, errors::AgentError};

pub const RPC_PATH: &str = "/mcp/rpc";
pub const HEALTH_PATH: &str = "/health";
pub const SESSION_HEADER: &str = "Mcp-Session-Id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Base URL of the server, for diagnostics.
    fn base_url(&self) -> &str;

    async fn post_json(
        &self,
        payload: &Value,
        session_id: Option<&str>,
    ) -> Result<TransportResponse, AgentError>;

    /// Returns the HTTP status of the health endpoint.
    async fn get_health(&self) -> Result<u16, AgentError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    rpc_url: String,
    health_url: String,
    health_timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self, AgentError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(AgentError::Transport)?;

        let base_url = config.display_url();
        Ok(Self {
            client,
            rpc_url: format!("{base_url}{RPC_PATH}"),
            health_url: format!("{base_url}{HEALTH_PATH}"),
            base_url,
            health_timeout: config.health_timeout,
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    pub fn health_url(&self) -> &str {
        &self.health_url
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json(
        &self,
        payload: &Value,
        session_id: Option<&str>,
    ) -> Result<TransportResponse, AgentError> {
        let body =
            serde_json::to_vec(payload).map_err(|err| AgentError::decode("request body", err))?;

        let mut request = self
            .client
            .post(&self.rpc_url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body);

        if let Some(session_id) = session_id {
            request = request.header(SESSION_HEADER, session_id);
        }

        let response = request
            .send()
            .await
            .map_err(|err| AgentError::from_reqwest(&self.rpc_url, err))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| AgentError::from_reqwest(&self.rpc_url, err))?;

        debug!(status, bytes = body.len(), "rpc response received");
        Ok(TransportResponse { status, body })
    }

    async fn get_health(&self) -> Result<u16, AgentError> {
        let response = self
            .client
            .get(&self.health_url)
            .timeout(self.health_timeout)
            .send()
            .await
            .map_err(|err| AgentError::from_reqwest(&self.health_url, err))?;

        Ok(response.status().as_u16())
    }
}
