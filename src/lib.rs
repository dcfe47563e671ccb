pub mod config;
pub mod demo;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod mcp;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use errors::AgentError;
pub use mcp::client::McpAgent;
