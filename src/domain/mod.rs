//! GLSP diagram vocabulary layered over the generic MCP client
//!
//! Typed tool arguments, resource URIs and payloads, and prompt templates.

pub mod prompts;
pub mod resources;
pub mod tools;
