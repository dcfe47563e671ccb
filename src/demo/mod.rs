//! Scripted demonstrations of an agent driving the diagram server
//!
//! Narration is written to a caller-supplied writer; diagnostics go through
//! `tracing`.

pub mod prompts;
pub mod workflow;

use std::io::Write;

use crate::{errors::AgentError, mcp::client::McpAgent};

use self::{
    prompts::{run_prompts, PromptOutcome},
    workflow::{run_workflow, WorkflowOptions, WorkflowReport},
};

pub const SEPARATOR: &str = "=";

#[derive(Debug)]
pub enum DemoOutcome {
    Unhealthy,
    Completed {
        workflow: WorkflowReport,
        prompts: Vec<PromptOutcome>,
    },
}

impl DemoOutcome {
    /// Healthy server, completed workflow and every prompt generated.
    pub fn succeeded(&self) -> bool {
        match self {
            Self::Unhealthy => false,
            Self::Completed { prompts, .. } => {
                prompts.iter().all(|outcome| outcome.result.is_ok())
            }
        }
    }
}

/// Health check, then the workflow and prompt walkthroughs, each on a fresh
/// agent from `make_agent`.
pub async fn run_full_demo<W, F>(
    make_agent: F,
    out: &mut W,
    options: &WorkflowOptions,
) -> Result<DemoOutcome, AgentError>
where
    W: Write,
    F: Fn() -> Result<McpAgent, AgentError>,
{
    let probe = make_agent()?;
    if !probe.health_check().await? {
        writeln!(out, "Server health check failed")?;
        return Ok(DemoOutcome::Unhealthy);
    }
    writeln!(out, "MCP-GLSP server is running")?;

    let workflow = run_workflow(&make_agent()?, out, options).await?;
    writeln!(out, "\n{}", SEPARATOR.repeat(60))?;
    let prompts = run_prompts(&make_agent()?, out).await?;

    Ok(DemoOutcome::Completed { workflow, prompts })
}
