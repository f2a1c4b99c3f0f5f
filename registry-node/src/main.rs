//! registry-node: command-line operator for the Elohim content registry
//!
//! Keeps a registry snapshot on disk and applies one call per invocation
//! (or a whole transaction log with `replay`), in order, the same way a
//! chain would apply them block by block.

mod cli;
mod config;
mod state_file;

use std::path::PathBuf;

use clap::Parser;
use content_registry_integrity::AgentId;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{Commands, NodeContext};
use config::Config;

#[derive(Parser)]
#[command(name = "registry-node")]
#[command(about = "Operate a content curation registry")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "registry-node.toml")]
    config: PathBuf,

    /// Registry state file (overrides config file)
    #[arg(short, long, env = "REGISTRY_STATE")]
    state: Option<PathBuf>,

    /// Principal invoking mutating commands
    #[arg(long, env = "REGISTRY_SENDER")]
    sender: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!("Config file: {}", cli.config.display());

    let state_path = cli.state.unwrap_or_else(|| config.state.path.clone());
    info!("State file: {}", state_path.display());

    let ctx = NodeContext {
        config,
        state_path,
        sender: cli.sender.map(AgentId::new),
    };

    match cli::execute_command(&ctx, cli.command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
