//! Testing utilities and mock implementations
//!
//! Mocks here let the agent loop and servers run in tests without a live
//! model endpoint.

pub mod mocks;

pub use mocks::*;
