//! HTTP API handlers.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{instrument, warn};

use crate::assistant::{AssistantClient, Operation};
use crate::config::Config;
use crate::error::ProxyError;
use crate::metrics;

use super::route::Route;

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Configuration built at startup.
    pub config: Arc<Config>,
    /// Upstream client.
    pub client: Arc<AssistantClient>,
}

impl AppState {
    /// Create new app state.
    pub fn new(config: Config, client: AssistantClient) -> Self {
        Self {
            config: Arc::new(config),
            client: Arc::new(client),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Proxy handler for every path other than `/health`.
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    let route = Route::from_path(uri.path());
    let label = route.map(|r| r.as_str()).unwrap_or("unmatched");

    let body = body.map_err(|rejection| ProxyError::Body {
        status: rejection.status(),
        message: rejection.body_text(),
    });

    let response = match proxy(&state, route, &method, query, body).await {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(err) => {
            if err.status().is_server_error() || matches!(err, ProxyError::Body { .. }) {
                warn!(route = label, status = %err.status(), error = %err, "Request failed");
            }
            err.into_response()
        }
    };

    metrics::inc_requests(label, response.status().as_u16());
    response
}

/// Validate the request and issue the single upstream call.
#[instrument(skip(state, query, body))]
async fn proxy(
    state: &AppState,
    route: Option<Route>,
    method: &Method,
    query: HashMap<String, String>,
    body: Result<Bytes, ProxyError>,
) -> Result<Value, ProxyError> {
    let credentials = state.config.credentials()?;

    let route = route.ok_or(ProxyError::NotFound)?;
    if *method != route.method() {
        return Err(ProxyError::MethodNotAllowed);
    }

    let fields = if route.method() == Method::GET {
        query
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect()
    } else {
        body_fields(&body?)
    };

    let operation = Operation::from_fields(route, &fields)?;
    state.client.execute(&credentials, &operation).await
}

/// Parse a JSON object body; anything else reads as no fields.
fn body_fields(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}
