//! glsp-mcp-agent: drives an MCP-GLSP diagram server the way an AI agent would.

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{error, info};

use glsp_mcp_agent::{
    config::{Config, ConfigError},
    demo::{
        prompts::run_prompts,
        run_full_demo,
        workflow::{run_workflow, WorkflowOptions, DEFAULT_DIAGRAM_NAME},
        SEPARATOR,
    },
    domain::prompts::parse_argument_pairs,
    logging, AgentError, McpAgent,
};

/// Agent client for an MCP-GLSP diagram server.
///
/// Without a command, checks server health and runs the workflow and prompt
/// demonstrations.
#[derive(Parser, Debug)]
#[command(name = "glsp-mcp-agent")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the server (overrides GLSP_MCP_URL)
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Health check followed by the workflow and prompt demonstrations
    Demo {
        /// Write the exported SVG to this file
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
    },
    /// Build, analyze and export the order fulfillment workflow
    Workflow {
        /// Write the exported SVG to this file
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,
        /// Name of the diagram to create
        #[arg(long, default_value = DEFAULT_DIAGRAM_NAME)]
        name: String,
    },
    /// Generate the showcase prompts
    Prompts,
    /// Check whether the server answers on its health endpoint
    Health,
    /// List the server's tools
    Tools,
    /// List the server's resources
    Resources,
    /// List the server's prompts
    PromptList,
    /// Call a single tool
    CallTool {
        name: String,
        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}", value_parser = parse_json_object)]
        args: Value,
    },
    /// Read a single resource
    ReadResource { uri: String },
    /// Fetch a single prompt
    GetPrompt {
        name: String,
        /// Prompt argument, repeatable
        #[arg(long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,
    },
}

impl Command {
    fn is_demo(&self) -> bool {
        matches!(self, Self::Demo { .. } | Self::Workflow { .. } | Self::Prompts)
    }
}

fn parse_json_object(raw: &str) -> Result<Value, String> {
    let value: Value = serde_json::from_str(raw).map_err(|err| err.to_string())?;
    if value.is_object() {
        Ok(value)
    } else {
        Err("tool arguments must be a JSON object".to_string())
    }
}

fn load_config(server: Option<&str>) -> Result<Config, ConfigError> {
    let config = Config::from_env()?;
    match server {
        Some(url) => config.with_server_url(url),
        None => Ok(config),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(logging::level_from_flags(cli.verbose, cli.quiet));

    let config = match load_config(cli.server.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let command = cli.command.unwrap_or(Command::Demo { export: None });
    let is_demo = command.is_demo();
    info!(server = %config.display_url(), ?command, "agent starting");

    let mut out = io::stdout();
    let result = run(command, &config, &mut out).await;
    match report(result, &config, is_demo, &mut out) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!(error = %err, "failed to write output");
            ExitCode::FAILURE
        }
    }
}

/// Prints the user-facing failure message for `result` and tells whether the
/// run succeeded.
fn report<W: Write>(
    result: Result<bool, AgentError>,
    config: &Config,
    is_demo: bool,
    out: &mut W,
) -> io::Result<bool> {
    match result {
        Ok(succeeded) => Ok(succeeded),
        Err(err) if err.is_unreachable() => {
            writeln!(
                out,
                "Cannot connect to MCP-GLSP server at {}",
                config.display_url()
            )?;
            writeln!(
                out,
                "Please make sure the server is running with: cargo run --bin server"
            )?;
            Ok(false)
        }
        Err(err) => {
            error!(error = %err, "agent run failed");
            if is_demo {
                writeln!(out, "Demo failed: {err}")?;
            } else {
                writeln!(out, "Request failed: {err}")?;
            }
            Ok(false)
        }
    }
}

async fn run<W: Write>(command: Command, config: &Config, out: &mut W) -> Result<bool, AgentError> {
    let make_agent = || McpAgent::from_config(config);

    match command {
        Command::Demo { export } => {
            writeln!(out, "MCP-GLSP AI Agent Demonstration")?;
            writeln!(out, "{}", SEPARATOR.repeat(50))?;
            writeln!(
                out,
                "This demo shows how AI agents can create and analyze diagrams"
            )?;
            writeln!(out, "using the Model Context Protocol (MCP) interface.\n")?;

            let options = WorkflowOptions {
                export_path: export,
                ..WorkflowOptions::default()
            };
            let outcome = run_full_demo(make_agent, out, &options).await?;
            Ok(outcome.succeeded())
        }
        Command::Workflow { export, name } => {
            let options = WorkflowOptions {
                diagram_name: name,
                export_path: export,
                ..WorkflowOptions::default()
            };
            run_workflow(&make_agent()?, out, &options).await?;
            Ok(true)
        }
        Command::Prompts => {
            let outcomes = run_prompts(&make_agent()?, out).await?;
            Ok(outcomes.iter().all(|outcome| outcome.result.is_ok()))
        }
        Command::Health => {
            let healthy = make_agent()?.health_check().await?;
            if healthy {
                writeln!(out, "MCP-GLSP server is running")?;
            } else {
                writeln!(out, "Server health check failed")?;
            }
            Ok(healthy)
        }
        Command::Tools => print_listing(&make_agent()?, out, Listing::Tools).await,
        Command::Resources => print_listing(&make_agent()?, out, Listing::Resources).await,
        Command::PromptList => print_listing(&make_agent()?, out, Listing::Prompts).await,
        Command::CallTool { name, args } => {
            let agent = make_agent()?;
            agent.initialize().await?;
            let result = agent.call_tool(&name, args).await?;
            for content in &result.content {
                writeln!(out, "{}", content.text)?;
            }
            Ok(true)
        }
        Command::ReadResource { uri } => {
            let agent = make_agent()?;
            agent.initialize().await?;
            let content = agent.read_resource(&uri).await?;
            match (content.text.as_deref(), content.blob.as_deref()) {
                (Some(text), _) => writeln!(out, "{text}")?,
                (None, Some(blob)) => writeln!(
                    out,
                    "<binary content, {} base64 bytes, {}>",
                    blob.len(),
                    content.mime_type.as_deref().unwrap_or("unknown type")
                )?,
                (None, None) => writeln!(out, "<empty resource>")?,
            }
            Ok(true)
        }
        Command::GetPrompt { name, args } => {
            let arguments = parse_argument_pairs(args.as_slice()).map_err(AgentError::unexpected)?;
            let agent = make_agent()?;
            agent.initialize().await?;
            let prompt = agent.get_prompt(&name, arguments).await?;
            if let Some(description) = prompt.description.as_deref() {
                writeln!(out, "{description}")?;
            }
            for message in &prompt.messages {
                writeln!(out, "[{}] {}", message.role, message.content.text)?;
            }
            Ok(true)
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Listing {
    Tools,
    Resources,
    Prompts,
}

async fn print_listing<W: Write>(
    agent: &McpAgent,
    out: &mut W,
    listing: Listing,
) -> Result<bool, AgentError> {
    agent.initialize().await?;
    let entries = match listing {
        Listing::Tools => agent.list_tools().await?,
        Listing::Resources => agent.list_resources().await?,
        Listing::Prompts => agent.list_prompts().await?,
    };
    for entry in &entries {
        match entry.description.as_deref() {
            Some(description) => writeln!(out, "{} - {description}", entry.label())?,
            None => writeln!(out, "{}", entry.label())?,
        }
    }
    Ok(true)
}
