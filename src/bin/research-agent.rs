//! Research agent backed by Google search
//!
//! Answers a query by interleaving Gemini completions with Serper-backed
//! Google searches, then prints the final answer.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use concierge::agent::Agent;
use concierge::config::Config;
use concierge::llm::providers::gemini::{GeminiConfig, GeminiProvider};
use concierge::logging::init_default_logging;
use concierge::tools::builtin::GoogleSearchTool;
use concierge::tools::ToolSet;

const SYSTEM_PROMPT: &str = "You are a helpful research assistant with access to Google search. \
    Use the search tool to find current information. Always cite sources when providing \
    information. Be accurate and concise.";

#[derive(Parser)]
#[command(name = "research-agent")]
#[command(about = "Research questions with Gemini and Google search")]
#[command(version)]
struct Cli {
    /// Research query
    #[arg(default_value = "What are the latest developments in AI?")]
    query: String,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_default_logging();

    let config = Config::load(cli.config.as_deref())?;
    let provider = GeminiProvider::new(GeminiConfig::from_config(&config)?)?;

    let mut tools = ToolSet::new();
    tools.register(Box::new(GoogleSearchTool::new()));
    tools.initialize(&config).await?;

    let agent = Agent::new(Arc::new(provider), tools, SYSTEM_PROMPT, &config);

    println!("\n🤖 Query: {}\n", cli.query);

    let messages = agent.run(&cli.query).await?;
    println!("\n✅ Response:\n{}\n", Agent::final_answer(&messages));

    Ok(())
}
