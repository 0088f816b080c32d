//! Restaurant menu chat server
//!
//! Serves a chat page and a `/chat` endpoint backed by a Gemini agent with a
//! menu lookup tool.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use concierge::agent::Agent;
use concierge::config::Config;
use concierge::http::ChatServer;
use concierge::llm::providers::gemini::{GeminiConfig, GeminiProvider};
use concierge::logging::init_default_logging;
use concierge::tools::builtin::GetMenuTool;
use concierge::tools::ToolSet;
use tokio::signal;
use tracing::{error, info};

const SYSTEM_PROMPT: &str =
    "You are a helpful restaurant assistant that uses tools to answer menu questions.";

#[derive(Parser)]
#[command(name = "menu-server")]
#[command(about = "Serve the restaurant menu assistant over HTTP")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_default_logging();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_server(config).await {
        error!("Server failed: {}", e);
        process::exit(1);
    }

    info!("Application shutdown complete");
}

async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let provider = GeminiProvider::new(GeminiConfig::from_config(&config)?)?;

    let mut tools = ToolSet::new();
    tools.register(Box::new(GetMenuTool::new()));
    tools.initialize(&config).await?;

    let agent = Agent::new(Arc::new(provider), tools, SYSTEM_PROMPT, &config);
    let server = ChatServer::new(Arc::new(agent), &config);

    let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())?;
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;

    tokio::select! {
        _ = server.run() => {}
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    Ok(())
}
