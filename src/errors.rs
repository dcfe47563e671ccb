use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("MCP error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },
    #[error("cannot connect to {url}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("agent not initialized")]
    NotInitialized,
    #[error("tool {tool} failed: {message}")]
    ToolFailed { tool: String, message: String },
    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentError {
    pub fn decode(what: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { what, source }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse(message.into())
    }

    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Unreachable {
                url: url.to_string(),
                source: err,
            }
        } else if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Transport(err)
        }
    }

    /// True when no connection to the server could be established. A server
    /// that accepted the connection but answered too slowly is not unreachable.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}
