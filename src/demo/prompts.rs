//! Prompt generation walkthrough. Each prompt is requested independently; a
//! failing prompt is reported and the walkthrough moves on.

use std::io::Write;

use tracing::warn;

use crate::{
    domain::prompts::{add_error_handling, convert_diagram, generate_workflow, preview, PromptRequest},
    errors::AgentError,
    mcp::client::McpAgent,
};

use super::SEPARATOR;

pub const PROMPT_PREVIEW_CHARS: usize = 200;

#[derive(Debug)]
pub struct PromptOutcome {
    pub name: &'static str,
    /// Number of messages generated, or the error that prevented it.
    pub result: Result<usize, AgentError>,
}

pub fn showcase_prompts() -> Vec<PromptRequest> {
    vec![
        generate_workflow(
            "Create a customer support ticket resolution process",
            "bpmn",
        ),
        add_error_handling("example-id", "validation,system,business"),
        convert_diagram("example-id", "uml"),
    ]
}

pub async fn run_prompts<W: Write>(
    agent: &McpAgent,
    out: &mut W,
) -> Result<Vec<PromptOutcome>, AgentError> {
    agent.initialize().await?;

    writeln!(out, "\nAI Prompt Generation Demonstration")?;
    writeln!(out, "{}", SEPARATOR.repeat(50))?;

    let mut outcomes = Vec::new();
    for request in showcase_prompts() {
        writeln!(out, "\nGenerating '{}' prompt...", request.name)?;

        let result = match agent.get_prompt(request.name, request.arguments).await {
            Ok(prompt) => {
                writeln!(out, "Generated {} message(s)", prompt.messages.len())?;
                if let Some(text) = prompt.first_text() {
                    writeln!(out, "Preview: {}", preview(text, PROMPT_PREVIEW_CHARS))?;
                }
                Ok(prompt.messages.len())
            }
            Err(err) => {
                warn!(prompt = request.name, error = %err, "prompt generation failed");
                writeln!(out, "Error: {err}")?;
                Err(err)
            }
        };

        outcomes.push(PromptOutcome {
            name: request.name,
            result,
        });
    }

    Ok(outcomes)
}
