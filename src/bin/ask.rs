//! Single-shot Gemini prompt client
//!
//! Wraps one question in a fixed prompt template, sends it to Gemini, and
//! prints the reply.

use std::path::PathBuf;

use clap::Parser;
use concierge::config::Config;
use concierge::llm::provider::{CompletionRequest, LlmProvider, Message, MessageRole};
use concierge::llm::providers::gemini::{GeminiConfig, GeminiProvider};
use concierge::logging::init_default_logging;

const PROMPT_TEMPLATE: &str = "You are a helpful Assitant, Answer the question {question}";

#[derive(Parser)]
#[command(name = "ask")]
#[command(about = "Ask Gemini a single question")]
#[command(version)]
struct Cli {
    /// Question to ask
    #[arg(default_value = "What is the Future of AI in healthCare")]
    question: String,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn format_prompt(question: &str) -> String {
    PROMPT_TEMPLATE.replace("{question}", question)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_default_logging();

    let config = Config::load(cli.config.as_deref())?;
    let provider = GeminiProvider::new(GeminiConfig::from_config(&config)?)?;

    let request = CompletionRequest {
        messages: vec![Message {
            role: MessageRole::User,
            content: format_prompt(&cli.question),
        }],
        model: config.llm.model.clone(),
        max_tokens: Some(config.llm.max_output_tokens),
        temperature: Some(config.llm.temperature),
        tools: None,
    };

    let response = provider.complete(request).await?;
    println!("Gemini Response:\n{}", response.content.unwrap_or_default());

    Ok(())
}
