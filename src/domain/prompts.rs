//! Prompt templates offered by the diagram server and the arguments they take.

use std::collections::BTreeMap;

pub const ANALYZE_DIAGRAM: &str = "analyze_diagram";
pub const GENERATE_WORKFLOW: &str = "generate_workflow";
pub const ADD_ERROR_HANDLING: &str = "add_error_handling";
pub const CONVERT_DIAGRAM: &str = "convert_diagram";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub name: &'static str,
    pub arguments: BTreeMap<String, String>,
}

impl PromptRequest {
    fn new(name: &'static str, arguments: &[(&str, &str)]) -> Self {
        Self {
            name,
            arguments: arguments
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        }
    }
}

pub fn analyze_diagram(diagram_id: &str, focus: &str) -> PromptRequest {
    PromptRequest::new(ANALYZE_DIAGRAM, &[("diagram_id", diagram_id), ("focus", focus)])
}

pub fn generate_workflow(description: &str, style: &str) -> PromptRequest {
    PromptRequest::new(
        GENERATE_WORKFLOW,
        &[("description", description), ("style", style)],
    )
}

pub fn add_error_handling(diagram_id: &str, error_types: &str) -> PromptRequest {
    PromptRequest::new(
        ADD_ERROR_HANDLING,
        &[("diagram_id", diagram_id), ("error_types", error_types)],
    )
}

pub fn convert_diagram(diagram_id: &str, target_type: &str) -> PromptRequest {
    PromptRequest::new(
        CONVERT_DIAGRAM,
        &[("diagram_id", diagram_id), ("target_type", target_type)],
    )
}

/// First `max_chars` characters of `text` followed by `...`.
pub fn preview(text: &str, max_chars: usize) -> String {
    let cut = text
        .char_indices()
        .nth(max_chars)
        .map(|(index, _)| index)
        .unwrap_or(text.len());
    format!("{}...", &text[..cut])
}

/// Parses `key=value` pairs as given on the command line.
pub fn parse_argument_pairs<S: AsRef<str>>(
    pairs: &[S],
) -> Result<BTreeMap<String, String>, String> {
    pairs
        .iter()
        .map(|pair| {
            let pair = pair.as_ref();
            match pair.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    Ok((key.trim().to_string(), value.to_string()))
                }
                _ => Err(format!("expected key=value, got `{pair}`")),
            }
        })
        .collect()
}
