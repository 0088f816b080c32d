//! LLM provider abstraction layer
//!
//! This module provides a provider-agnostic interface for LLM interactions.
//! Gemini is the only production backend; tests inject mock providers
//! through the same trait.

pub mod provider;
pub mod providers;

pub use provider::*;
pub use providers::*;
