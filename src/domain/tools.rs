//! Typed arguments for the diagram server's MCP tools
//!
//! Each argument struct serializes to the exact JSON object the server expects
//! under `tools/call` `arguments`, and names the tool it belongs to.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::errors::AgentError;

pub const CREATE_DIAGRAM: &str = "create_diagram";
pub const CREATE_NODE: &str = "create_node";
pub const CREATE_EDGE: &str = "create_edge";
pub const APPLY_LAYOUT: &str = "apply_layout";
pub const EXPORT_DIAGRAM: &str = "export_diagram";

const CREATED_ID_MARKER: &str = "ID: ";

static EXPORT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Exported diagram as [A-Za-z]+:\r?\n").expect("export header pattern compiles")
});

pub trait ToolArguments: Serialize {
    const TOOL: &'static str;

    fn to_arguments(&self) -> Result<Value, AgentError> {
        serde_json::to_value(self).map_err(|err| AgentError::decode("tool arguments", err))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagramType {
    Bpmn,
    Workflow,
    Uml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    StartEvent,
    EndEvent,
    Task,
    Gateway,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StartEvent => "start event",
            Self::EndEvent => "end event",
            Self::Task => "task",
            Self::Gateway => "gateway",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeType {
    SequenceFlow,
    MessageFlow,
    Association,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutAlgorithm {
    Hierarchical,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Svg,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiagram {
    pub diagram_type: DiagramType,
    pub name: String,
}

impl ToolArguments for CreateDiagram {
    const TOOL: &'static str = CREATE_DIAGRAM;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNode {
    pub diagram_id: String,
    pub node_type: NodeType,
    pub position: Position,
    pub label: String,
}

impl ToolArguments for CreateNode {
    const TOOL: &'static str = CREATE_NODE;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEdge {
    pub diagram_id: String,
    pub edge_type: EdgeType,
    pub source_id: String,
    pub target_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ToolArguments for CreateEdge {
    const TOOL: &'static str = CREATE_EDGE;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyLayout {
    pub diagram_id: String,
    pub algorithm: LayoutAlgorithm,
}

impl ToolArguments for ApplyLayout {
    const TOOL: &'static str = APPLY_LAYOUT;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDiagram {
    pub diagram_id: String,
    pub format: ExportFormat,
}

impl ToolArguments for ExportDiagram {
    const TOOL: &'static str = EXPORT_DIAGRAM;
}

/// Identifier announced by the last `ID: <id>` marker of a tool reply,
/// e.g. `Created task node with ID: 3f2a...`.
pub fn extract_created_id(text: &str) -> Option<String> {
    let (_, tail) = text.rsplit_once(CREATED_ID_MARKER)?;
    let id = tail.split(char::is_whitespace).next().unwrap_or_default();
    (!id.is_empty()).then(|| id.to_string())
}

/// Drops the `Exported diagram as SVG:` line that precedes exported content.
pub fn strip_export_header(text: &str) -> &str {
    match EXPORT_HEADER.find(text) {
        Some(header) => &text[header.end()..],
        None => text,
    }
}
