//! Model Context Protocol client plumbing
//!
//! JSON-RPC envelopes, MCP payload types, and the agent that drives a remote
//! MCP-GLSP server.

pub mod client;
pub mod protocol;
pub mod rpc;
