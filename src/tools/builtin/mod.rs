//! Builtin tool implementations
//!
//! Each tool lives in its own module with pure functions separated from I/O:
//! web search for the research agent, menu lookup for the restaurant chat
//! server, and currency conversion for the JSON-RPC tool server.

pub mod currency;
pub mod google_search;
pub mod menu;

pub use currency::ConvertCurrencyTool;
pub use google_search::GoogleSearchTool;
pub use menu::GetMenuTool;
