//! Server-side proxy for the OpenAI Assistants API.
//!
//! A browser client calls this service instead of the Assistants API so the
//! secret API key never leaves the server. Each request maps onto exactly one
//! upstream call:
//!
//! ```text
//! POST .../create-thread                       -> POST /threads
//! POST .../add-message       {threadId,content} -> POST /threads/{id}/messages
//! POST .../create-run        {threadId}         -> POST /threads/{id}/runs
//! GET  .../check-run-status  ?threadId&runId    -> GET  /threads/{id}/runs/{run}
//! GET  .../get-messages      ?threadId          -> GET  /threads/{id}/messages?limit=N
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`assistant`]: Upstream client and transport
//! - [`api`]: HTTP router, CORS headers and handlers
//! - [`metrics`]: Request and upstream metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod assistant;
pub mod config;
pub mod error;
pub mod metrics;
pub mod utils;

pub use config::Config;
pub use error::{ProxyError, Result};
