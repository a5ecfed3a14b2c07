//! Troupe - Multi-Agent LLM Orchestration Engine
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use troupe::agent::default_registry;
use troupe::Config;

/// Troupe - Multi-Agent LLM Orchestration Engine
#[derive(Parser, Debug)]
#[command(name = "troupe")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Prompt file (e.g. task.prompt.md) read once as the initial user
    /// message
    prompt_file: Option<PathBuf>,

    /// Inline prompt (alternative to a prompt file)
    #[arg(long, short = 'p')]
    prompt: Option<String>,

    /// Agent to send the prompt to
    #[arg(long, short = 'a')]
    agent: Option<String>,

    /// Model service name, e.g. anthropic/claude-3-5-sonnet-20240620
    #[arg(long, short = 'm')]
    msn: Option<String>,

    /// Workspace directory the file tools operate in
    #[arg(long, short = 'w')]
    workspace: Option<PathBuf>,

    /// Skip command execution confirmations
    #[arg(long)]
    yes: bool,

    /// List registered agents and exit
    #[arg(long)]
    list_agents: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(ref msn) = args.msn {
        config.model.msn = Some(msn.clone());
    }

    if let Some(ref workspace) = args.workspace {
        config.workspace.root = workspace.clone();
    }

    if args.yes {
        config.workspace.auto_approve_commands = true;
    }

    let agent_name = args.agent.unwrap_or_else(|| config.default_agent.clone());
    let registry = default_registry(&config)?;

    if args.list_agents {
        for name in registry.agent_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let prompt = match (args.prompt, args.prompt_file) {
        (Some(prompt), _) => prompt,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read prompt file {}", path.display()))?,
        (None, None) => anyhow::bail!("provide a prompt file or --prompt"),
    };

    let service = registry.service(&agent_name)?;
    service.send_to(prompt.trim()).await?;
    let response = service.receive_from().await?;

    println!("{}", response);

    registry.shutdown();
    Ok(())
}
