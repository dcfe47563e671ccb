//! In-memory stand-ins for the MCP-GLSP server used by unit tests.

use std::{
    collections::{BTreeMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
    errors::AgentError,
    transport::{RpcTransport, TransportResponse},
};

type Responder = Box<dyn FnMut(&Value) -> TransportResponse + Send>;

pub struct ScriptedTransport {
    responder: Mutex<Responder>,
    sent: Mutex<Vec<Value>>,
    sessions: Mutex<Vec<Option<String>>>,
    health_status: u16,
}

impl ScriptedTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: FnMut(&Value) -> TransportResponse + Send + 'static,
    {
        Self {
            responder: Mutex::new(Box::new(responder)),
            sent: Mutex::new(Vec::new()),
            sessions: Mutex::new(Vec::new()),
            health_status: 200,
        }
    }

    pub fn fake_server() -> Self {
        Self::fake_server_with(FakeGlspServer::default())
    }

    pub fn fake_server_with(mut server: FakeGlspServer) -> Self {
        Self::new(move |payload| TransportResponse {
            status: 200,
            body: server.handle(payload).to_string(),
        })
    }

    pub fn with_health_status(mut self, status: u16) -> Self {
        self.health_status = status;
        self
    }

    pub fn sent(&self) -> Vec<Value> {
        self.sent.lock().expect("sent lock").clone()
    }

    pub fn sessions(&self) -> Vec<Option<String>> {
        self.sessions.lock().expect("sessions lock").clone()
    }
}

#[async_trait]
impl RpcTransport for ScriptedTransport {
    fn base_url(&self) -> &str {
        "http://127.0.0.1:3000"
    }

    async fn post_json(
        &self,
        payload: &Value,
        session_id: Option<&str>,
    ) -> Result<TransportResponse, AgentError> {
        self.sent.lock().expect("sent lock").push(payload.clone());
        self.sessions
            .lock()
            .expect("sessions lock")
            .push(session_id.map(str::to_string));
        let mut responder = self.responder.lock().expect("responder lock");
        Ok(responder(payload))
    }

    async fn get_health(&self) -> Result<u16, AgentError> {
        Ok(self.health_status)
    }
}

#[derive(Debug, Clone)]
struct FakeDiagram {
    diagram_type: String,
    revision: u32,
    elements: BTreeMap<String, Value>,
}

/// A small stateful imitation of the diagram server's JSON-RPC surface.
#[derive(Debug, Default)]
pub struct FakeGlspServer {
    diagrams: BTreeMap<String, FakeDiagram>,
    next_id: u32,
    session_id: Option<String>,
    failing_prompts: HashSet<String>,
}

impl FakeGlspServer {
    pub fn with_session_id(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_string());
        self
    }

    pub fn with_failing_prompt(mut self, name: &str) -> Self {
        self.failing_prompts.insert(name.to_string());
        self
    }

    pub fn handle(&mut self, payload: &Value) -> Value {
        let id = payload.get("id").cloned().unwrap_or(Value::Null);
        let params = payload.get("params").cloned().unwrap_or(Value::Null);
        let method = payload["method"].as_str().unwrap_or_default();

        let outcome = match method {
            "initialize" => Ok(self.initialize_result()),
            "initialized" => Ok(json!({})),
            "tools/list" => Ok(json!({"tools": [
                {"name": "create_diagram", "description": "Create a new diagram"},
                {"name": "create_node", "description": "Create a node"},
                {"name": "create_edge", "description": "Connect two elements"},
                {"name": "apply_layout", "description": "Apply a layout algorithm"},
                {"name": "export_diagram", "description": "Export a diagram"}
            ]})),
            "resources/list" => Ok(json!({"resources": [
                {"uri": "diagram://list", "name": "Diagram list"}
            ]})),
            "prompts/list" => Ok(json!({"prompts": [
                {"name": "generate_workflow"},
                {"name": "analyze_diagram"},
                {"name": "add_error_handling"},
                {"name": "convert_diagram"}
            ]})),
            "tools/call" => self.call_tool(&params),
            "resources/read" => self.read_resource(&params),
            "prompts/get" => self.get_prompt(&params),
            _ => Err((-32601, "Method not found")),
        };

        match outcome {
            Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
            Err((code, message)) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {"code": code, "message": message}
            }),
        }
    }

    fn initialize_result(&self) -> Value {
        let mut result = json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {"listChanged": false},
                "resources": {"subscribe": false, "listChanged": false},
                "prompts": {"listChanged": false}
            },
            "serverInfo": {"name": "MCP-GLSP Server", "version": "0.1.0"}
        });
        if let Some(session_id) = &self.session_id {
            result["sessionId"] = json!(session_id);
        }
        result
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn call_tool(&mut self, params: &Value) -> Result<Value, (i64, &'static str)> {
        let args = &params["arguments"];
        let text = |text: String| json!({"content": [{"type": "text", "text": text}]});
        let failure = |text: String| {
            json!({"content": [{"type": "text", "text": text}], "isError": true})
        };

        match params["name"].as_str().unwrap_or_default() {
            "create_diagram" => {
                let diagram_type = args["diagramType"].as_str().ok_or((-32603, "Internal error"))?;
                let id = self.next_id("diagram");
                let mut elements = BTreeMap::new();
                elements.insert(id.clone(), json!({"id": id, "type": "graph"}));
                self.diagrams.insert(
                    id.clone(),
                    FakeDiagram {
                        diagram_type: diagram_type.to_string(),
                        revision: 0,
                        elements,
                    },
                );
                Ok(text(format!(
                    "Created diagram '{diagram_type}' with ID: {id}"
                )))
            }
            "create_node" => {
                let node_type = args["nodeType"].as_str().ok_or((-32603, "Internal error"))?;
                let diagram_id = args["diagramId"].as_str().unwrap_or_default().to_string();
                if !self.diagrams.contains_key(&diagram_id) {
                    return Err((-32603, "Internal error"));
                }
                let node_id = self.next_id("node");
                let diagram = self
                    .diagrams
                    .get_mut(&diagram_id)
                    .ok_or((-32603, "Internal error"))?;
                diagram.elements.insert(
                    node_id.clone(),
                    json!({
                        "id": node_id,
                        "type": node_type,
                        "label": args["label"],
                        "bounds": {"x": args["position"]["x"], "y": args["position"]["y"]}
                    }),
                );
                diagram.revision += 1;
                Ok(text(format!("Created {node_type} node with ID: {node_id}")))
            }
            "create_edge" => {
                let edge_type = args["edgeType"].as_str().unwrap_or("edge").to_string();
                let diagram_id = args["diagramId"].as_str().unwrap_or_default().to_string();
                let source = args["sourceId"].as_str().unwrap_or_default().to_string();
                let target = args["targetId"].as_str().unwrap_or_default().to_string();
                if !self.diagrams.contains_key(&diagram_id) {
                    return Ok(failure(format!("Diagram {diagram_id} not found")));
                }
                let edge_id = self.next_id("edge");
                let diagram = self
                    .diagrams
                    .get_mut(&diagram_id)
                    .ok_or((-32603, "Internal error"))?;
                if !diagram.elements.contains_key(&source) {
                    return Ok(failure(format!("Source element {source} not found")));
                }
                if !diagram.elements.contains_key(&target) {
                    return Ok(failure(format!("Target element {target} not found")));
                }
                diagram.elements.insert(
                    edge_id.clone(),
                    json!({
                        "id": edge_id,
                        "type": edge_type,
                        "sourceId": source,
                        "targetId": target
                    }),
                );
                diagram.revision += 1;
                Ok(text(format!("Created {edge_type} edge with ID: {edge_id}")))
            }
            "apply_layout" => {
                let algorithm = args["algorithm"].as_str().unwrap_or_default().to_string();
                let diagram_id = args["diagramId"].as_str().unwrap_or_default().to_string();
                let diagram = self
                    .diagrams
                    .get_mut(&diagram_id)
                    .ok_or((-32603, "Internal error"))?;
                diagram.revision += 1;
                Ok(text(format!(
                    "Applied {algorithm} layout to diagram {diagram_id}"
                )))
            }
            "export_diagram" => {
                let diagram_id = args["diagramId"].as_str().unwrap_or_default().to_string();
                let diagram = self
                    .diagrams
                    .get(&diagram_id)
                    .ok_or((-32603, "Internal error"))?;
                match args["format"].as_str().unwrap_or_default() {
                    "svg" => Ok(text(format!(
                        "Exported diagram as SVG:\n<svg xmlns=\"http://www.w3.org/2000/svg\"><!-- {} elements --></svg>",
                        diagram.elements.len()
                    ))),
                    "json" => Ok(text(format!(
                        "Exported diagram as JSON:\n{}",
                        json!({"id": diagram_id, "revision": diagram.revision})
                    ))),
                    other => Ok(failure(format!(
                        "Export format '{other}' not supported yet"
                    ))),
                }
            }
            _ => Err((-32603, "Internal error")),
        }
    }

    fn read_resource(&self, params: &Value) -> Result<Value, (i64, &'static str)> {
        let uri = params["uri"].as_str().ok_or((-32602, "Invalid params"))?;

        if let Some(diagram_id) = uri.strip_prefix("diagram://model/") {
            let diagram = self
                .diagrams
                .get(diagram_id)
                .ok_or((-32603, "Internal error"))?;
            let model = json!({
                "id": diagram_id,
                "diagramType": diagram.diagram_type,
                "revision": diagram.revision,
                "elements": diagram.elements
            });
            return Ok(json!({
                "uri": uri,
                "mimeType": "application/vnd.glsp-model+json",
                "text": model.to_string()
            }));
        }

        if let Some(diagram_id) = uri.strip_prefix("diagram://validation/") {
            let diagram = self
                .diagrams
                .get(diagram_id)
                .ok_or((-32603, "Internal error"))?;
            let connected: HashSet<&str> = diagram
                .elements
                .values()
                .flat_map(|element| [element["sourceId"].as_str(), element["targetId"].as_str()])
                .flatten()
                .collect();
            let issues: Vec<Value> = diagram
                .elements
                .values()
                .filter(|element| element.get("sourceId").is_none() && element["type"] != "graph")
                .filter_map(|element| element["id"].as_str())
                .filter(|id| !connected.contains(id))
                .map(|id| {
                    json!({
                        "severity": "warning",
                        "message": format!("Node {id} is not connected"),
                        "elementId": id
                    })
                })
                .collect();
            let report = json!({
                "isValid": issues.is_empty(),
                "summary": {"errors": 0, "warnings": issues.len(), "info": 0},
                "issues": issues
            });
            return Ok(json!({
                "contents": [{
                    "uri": uri,
                    "mimeType": "application/json",
                    "text": report.to_string()
                }]
            }));
        }

        Err((-32603, "Internal error"))
    }

    fn get_prompt(&self, params: &Value) -> Result<Value, (i64, &'static str)> {
        let name = params["name"].as_str().ok_or((-32602, "Invalid params"))?;
        let known = [
            "generate_workflow",
            "optimize_layout",
            "add_error_handling",
            "analyze_diagram",
            "create_subprocess",
            "convert_diagram",
        ];
        if !known.contains(&name) || self.failing_prompts.contains(name) {
            return Err((-32603, "Internal error"));
        }

        let arguments = params
            .get("arguments")
            .map(Value::to_string)
            .unwrap_or_default();
        let body = format!(
            "Prompt {name} with arguments {arguments}. {}",
            "Consider the structure, naming and flow of the diagram in detail. ".repeat(12)
        );
        Ok(json!({
            "description": format!("Template for {name}"),
            "messages": [{"role": "user", "content": {"type": "text", "text": body}}]
        }))
    }
}
