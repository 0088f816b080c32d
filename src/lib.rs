//! Concierge - Gemini-backed assistants and tool servers
//!
//! Four small services built around one agent core: a single-shot prompt
//! client, a web-searching research agent, a currency conversion tool server
//! speaking newline-delimited JSON-RPC, and an HTTP chat endpoint backed by a
//! menu lookup tool.
//!
//! # Overview
//!
//! This crate provides:
//! - A Gemini provider behind the [`llm::provider::LlmProvider`] trait
//! - A tool system with JSON Schema validation
//! - An agent loop alternating completions and tool calls
//! - A JSON-RPC 2.0 tool server and a warp chat server
//!
//! # Quick Start
//!
//! ```rust
//! use concierge::llm::provider::{Message, MessageRole};
//! use concierge::rpc::{ContentBlock, ToolCallResult};
//!
//! // Conversations are role-tagged message lists
//! let question = Message {
//!     role: MessageRole::User,
//!     content: "Convert 100 USD to INR".to_string(),
//! };
//!
//! // Tool servers answer with text content blocks
//! let result = ToolCallResult {
//!     content: vec![ContentBlock::text(
//!         "✔ Converted 100 USD → 8300.00 INR\n(Exchange Rate: 1 USD = 83 INR)",
//!     )],
//! };
//!
//! let frame = serde_json::to_string(&result).unwrap();
//! assert!(frame.contains("8300.00"));
//! assert_eq!(question.role, MessageRole::User);
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod http;
pub mod llm;
pub mod logging;
pub mod rpc;
pub mod testing;
pub mod tools;

pub use agent::Agent;
pub use config::*;
pub use error::{ConciergeError, ConciergeResult};
pub use http::ChatServer;
pub use llm::provider::LlmProvider;
pub use llm::providers::gemini::GeminiProvider;
pub use rpc::RpcServer;
pub use tools::{Tool, ToolDescription, ToolError, ToolSet};
