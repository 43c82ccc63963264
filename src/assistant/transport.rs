//! Outbound HTTP seam between the client and the network.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::ProxyError;

/// A fully built outbound call.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: Url,
    /// Header name/value pairs.
    pub headers: Vec<(&'static str, String)>,
    /// JSON body, if any.
    pub body: Option<Value>,
}

impl UpstreamRequest {
    /// Look up a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw answer from the assistant API.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// Status code.
    pub status: StatusCode,
    /// Unparsed body.
    pub body: Bytes,
}

/// Sends one outbound request and returns whatever came back.
///
/// Implementations report non-2xx statuses as a normal [`UpstreamResponse`];
/// only failures with no status at all are errors.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send the request and wait for the full response body.
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, ProxyError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport using the configured request timeout.
    pub fn new(config: &Config) -> Result<Self, ProxyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .connect_timeout(Duration::from_secs(10))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| ProxyError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, ProxyError> {
        debug!(method = %request.method, url = %request.url, "Sending upstream request");

        let mut builder = self.http.request(request.method, request.url);
        for (key, value) in &request.headers {
            builder = builder.header(*key, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProxyError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ProxyError::Transport(format!("failed to read body: {}", e)))?;

        Ok(UpstreamResponse { status, body })
    }
}
