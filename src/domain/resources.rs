//! Diagram resources served under `diagram://` URIs
//!
//! The server renders the resource body as JSON text; these types decode the
//! parts the agent reports on.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::errors::AgentError;

pub fn model_uri(diagram_id: &str) -> String {
    format!("diagram://model/{diagram_id}")
}

pub fn validation_uri(diagram_id: &str) -> String {
    format!("diagram://validation/{diagram_id}")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramModel {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "diagram_type")]
    pub diagram_type: Option<String>,
    pub revision: u64,
    pub elements: BTreeMap<String, Value>,
}

impl DiagramModel {
    pub fn parse(text: &str) -> Result<Self, AgentError> {
        serde_json::from_str(text).map_err(|err| AgentError::decode("diagram model", err))
    }

    /// Elements excluding the root graph, which the server keeps in the same map.
    pub fn element_count(&self) -> usize {
        self.elements.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    #[serde(default)]
    pub issues: Vec<ValidationIssue>,
    #[serde(default)]
    pub summary: Option<ValidationSummary>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub element_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct ValidationSummary {
    #[serde(default)]
    pub errors: usize,
    #[serde(default)]
    pub warnings: usize,
    #[serde(default)]
    pub info: usize,
}

impl ValidationReport {
    pub fn parse(text: &str) -> Result<Self, AgentError> {
        serde_json::from_str(text).map_err(|err| AgentError::decode("validation report", err))
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_valid {
            "Valid"
        } else {
            "Has Issues"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uris_follow_server_scheme() {
        assert_eq!(model_uri("d-1"), "diagram://model/d-1");
        assert_eq!(validation_uri("d-1"), "diagram://validation/d-1");
    }

    #[test]
    fn element_count_excludes_root() {
        let model = DiagramModel::parse(
            r#"{
                "id": "d-1",
                "diagram_type": "bpmn",
                "revision": 9,
                "root": {"id": "d-1", "type": "graph"},
                "elements": {
                    "d-1": {"id": "d-1", "type": "graph"},
                    "n-1": {"id": "n-1", "type": "task"},
                    "n-2": {"id": "n-2", "type": "task"}
                }
            }"#,
        )
        .expect("model parses");

        assert_eq!(model.element_count(), 2);
        assert_eq!(model.revision, 9);
        assert_eq!(model.diagram_type.as_deref(), Some("bpmn"));
    }

    #[test]
    fn empty_model_does_not_underflow() {
        let model = DiagramModel::parse(r#"{"revision": 0, "elements": {}}"#).expect("parses");
        assert_eq!(model.element_count(), 0);
    }

    #[test]
    fn validation_report_with_issues() {
        let report = ValidationReport::parse(
            r#"{
                "isValid": false,
                "issues": [
                    {"severity": "warning", "message": "Node n-1 is not connected", "elementId": "n-1"}
                ],
                "summary": {"errors": 0, "warnings": 1, "info": 0}
            }"#,
        )
        .expect("report parses");

        assert_eq!(report.status_label(), "Has Issues");
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].element_id.as_deref(), Some("n-1"));
        assert_eq!(
            report.summary,
            Some(ValidationSummary {
                errors: 0,
                warnings: 1,
                info: 0
            })
        );
    }

    #[test]
    fn invalid_model_text_is_decode_error() {
        let err = DiagramModel::parse("not json").expect_err("must fail");
        assert!(matches!(err, AgentError::Decode { what: "diagram model", .. }));
    }
}
