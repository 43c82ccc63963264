//! OpenAI Assistants API client.

use std::sync::Arc;
use std::time::Instant;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, error, instrument};
use url::Url;

use crate::config::{Config, Credentials};
use crate::error::ProxyError;
use crate::metrics;

use super::transport::{Transport, UpstreamRequest, UpstreamResponse};
use super::types::{CreateMessageBody, CreateRunBody, Operation};

/// Issues exactly one upstream call per [`Operation`].
#[derive(Clone)]
pub struct AssistantClient {
    /// Outbound HTTP seam.
    transport: Arc<dyn Transport>,
    /// Base URL, e.g. `https://api.openai.com/v1`.
    base_url: Url,
    /// `OpenAI-Beta` header value.
    beta: String,
    /// Page size for message listing.
    messages_limit: u32,
}

impl std::fmt::Debug for AssistantClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantClient")
            .field("base_url", &self.base_url.as_str())
            .field("beta", &self.beta)
            .field("messages_limit", &self.messages_limit)
            .finish()
    }
}

impl AssistantClient {
    /// Create a client from config over the given transport.
    pub fn new(config: &Config, transport: Arc<dyn Transport>) -> Result<Self, ProxyError> {
        let base_url = Url::parse(&config.openai_base_url)
            .map_err(|e| ProxyError::InvalidUrl(format!("{}: {}", config.openai_base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(ProxyError::InvalidUrl(config.openai_base_url.clone()));
        }

        Ok(Self {
            transport,
            base_url,
            beta: config.openai_beta.clone(),
            messages_limit: config.messages_limit,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Run one operation and return the upstream JSON verbatim.
    #[instrument(
        skip(self, credentials, operation),
        fields(route = %operation.route(), thread_id = operation.thread_id().unwrap_or("-"))
    )]
    pub async fn execute(
        &self,
        credentials: &Credentials,
        operation: &Operation,
    ) -> Result<Value, ProxyError> {
        let request = self.build_request(credentials, operation)?;
        let route = operation.route().as_str();

        let start = Instant::now();
        let result = self.transport.send(request).await;
        metrics::record_upstream_latency(start, route);

        let response = result.map_err(|e| {
            error!(error = %e, "Upstream request failed");
            metrics::inc_upstream_failures(route);
            e
        })?;

        Self::into_payload(response).map_err(|e| {
            error!(status = %e.status(), error = %e.payload(), "Upstream returned an error");
            metrics::inc_upstream_failures(route);
            e
        })
    }

    /// Build the outbound request for an operation.
    pub fn build_request(
        &self,
        credentials: &Credentials,
        operation: &Operation,
    ) -> Result<UpstreamRequest, ProxyError> {
        let (method, url, body) = match operation {
            Operation::CreateThread => (Method::POST, self.url(&["threads"])?, Some(json!({}))),
            Operation::AddMessage { thread_id, content } => {
                let body = serde_json::to_value(CreateMessageBody {
                    role: "user",
                    content,
                })
                .map_err(ProxyError::RequestBody)?;
                (
                    Method::POST,
                    self.url(&["threads", thread_id.as_str(), "messages"])?,
                    Some(body),
                )
            }
            Operation::CreateRun { thread_id } => {
                let body = serde_json::to_value(CreateRunBody {
                    assistant_id: &credentials.assistant_id,
                })
                .map_err(ProxyError::RequestBody)?;
                (
                    Method::POST,
                    self.url(&["threads", thread_id.as_str(), "runs"])?,
                    Some(body),
                )
            }
            Operation::CheckRunStatus { thread_id, run_id } => (
                Method::GET,
                self.url(&["threads", thread_id.as_str(), "runs", run_id.as_str()])?,
                None,
            ),
            Operation::GetMessages { thread_id } => {
                let mut url = self.url(&["threads", thread_id.as_str(), "messages"])?;
                url.query_pairs_mut()
                    .append_pair("limit", &self.messages_limit.to_string());
                (Method::GET, url, None)
            }
        };

        let mut headers = vec![
            ("Authorization", format!("Bearer {}", credentials.api_key)),
            ("OpenAI-Beta", self.beta.clone()),
        ];
        if body.is_some() {
            headers.push(("Content-Type", "application/json".to_string()));
        }

        debug!(method = %method, url = %url, "Built upstream request");

        Ok(UpstreamRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, ProxyError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProxyError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Turn a raw response into the payload or an upstream error.
    fn into_payload(response: UpstreamResponse) -> Result<Value, ProxyError> {
        if response.status.is_success() {
            return serde_json::from_slice(&response.body).map_err(ProxyError::InvalidResponse);
        }

        Err(ProxyError::Upstream {
            status: response.status,
            payload: error_payload(response.status, &response.body),
        })
    }
}

/// Prefer the upstream JSON, then its text, then the status reason.
fn error_payload(status: StatusCode, body: &[u8]) -> Value {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        return value;
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if !text.is_empty() {
        return Value::String(text);
    }

    Value::String(
        status
            .canonical_reason()
            .unwrap_or("Upstream request failed")
            .to_string(),
    )
}
