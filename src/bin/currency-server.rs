//! Currency conversion tool server over stdio
//!
//! Speaks newline-delimited JSON-RPC 2.0 on stdin/stdout. Logs go to stderr
//! so the protocol stream stays clean.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use concierge::config::Config;
use concierge::logging::init_stderr_logging;
use concierge::rpc::RpcServer;
use concierge::tools::builtin::ConvertCurrencyTool;
use concierge::tools::ToolSet;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "currency-server")]
#[command(about = "Serve currency conversion over JSON-RPC on stdio")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_stderr_logging();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let mut tools = ToolSet::new();
    tools.register(Box::new(ConvertCurrencyTool::new()));
    if let Err(e) = tools.initialize(&config).await {
        error!("Failed to initialize tools: {}", e);
        process::exit(1);
    }

    let mut server = RpcServer::new("Currency Converter MCP Server", "1.0.0", tools);

    info!("MCP server connected");

    if let Err(e) = server.serve(tokio::io::stdin(), tokio::io::stdout()).await {
        error!("MCP server start failed: {}", e);
        process::exit(1);
    }

    if let Err(e) = server.shutdown().await {
        error!("Error during shutdown: {}", e);
    }
}
