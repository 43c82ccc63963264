//! Assistant module for the OpenAI Assistants API.
//!
//! This module handles:
//! - Validated operations and upstream request bodies
//! - The transport seam and its `reqwest` implementation
//! - The client that maps operations onto upstream calls
//! - A stub transport for testing

pub mod client;
pub mod mock;
pub mod transport;
pub mod types;

pub use client::AssistantClient;
pub use mock::StubTransport;
pub use transport::{HttpTransport, Transport, UpstreamRequest, UpstreamResponse};
pub use types::Operation;
