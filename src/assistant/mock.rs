//! Stub transport for unit testing.
//!
//! Answers every request with a canned response and records what it was
//! sent, so tests can run the full router without network access.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::StatusCode;
use serde_json::Value;

use crate::error::ProxyError;

use super::transport::{Transport, UpstreamRequest, UpstreamResponse};

#[derive(Debug, Clone)]
enum StubReply {
    Respond { status: StatusCode, body: Bytes },
    Fail(String),
}

/// Canned-response transport that records every request.
#[derive(Debug, Clone)]
pub struct StubTransport {
    reply: StubReply,
    requests: Arc<Mutex<Vec<UpstreamRequest>>>,
}

impl StubTransport {
    /// Answer every request with `200` and the given JSON.
    pub fn ok(body: Value) -> Self {
        Self::json(StatusCode::OK, body)
    }

    /// Answer every request with the given status and JSON body.
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self::raw(status, body.to_string())
    }

    /// Answer every request with the given status and raw body.
    pub fn raw(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::with_reply(StubReply::Respond {
            status,
            body: body.into(),
        })
    }

    /// Fail every request as if the connection had dropped.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(StubReply::Fail(message.into()))
    }

    fn with_reply(reply: StubReply) -> Self {
        Self {
            reply,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, ProxyError> {
        self.requests.lock().unwrap().push(request);

        match &self.reply {
            StubReply::Respond { status, body } => Ok(UpstreamResponse {
                status: *status,
                body: body.clone(),
            }),
            StubReply::Fail(message) => Err(ProxyError::Transport(message.clone())),
        }
    }
}
