//! Newline-delimited JSON-RPC 2.0 surface for tool servers

pub mod messages;
pub mod server;

pub use messages::*;
pub use server::RpcServer;
