//! Unified error types for the assistant proxy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;

/// Every way a proxied request can end without a 2xx upstream payload.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Server-side configuration is missing (API key, assistant ID).
    #[error("{0}")]
    Configuration(String),

    /// A required request field is missing or empty.
    #[error("{0}")]
    Validation(String),

    /// The request body could not be read (too large, aborted).
    #[error("{message}")]
    Body {
        /// Status chosen by the body extractor, e.g. 413.
        status: StatusCode,
        /// Rejection text.
        message: String,
    },

    /// The route exists but does not accept this method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// No route matches the request path.
    #[error("Not found")]
    NotFound,

    /// The assistant API answered with a non-success status.
    #[error("upstream returned {status}")]
    Upstream {
        /// Status code reported by the assistant API.
        status: StatusCode,
        /// Error payload relayed to the caller.
        payload: Value,
    },

    /// The outbound request could not be completed.
    #[error("upstream request failed: {0}")]
    Transport(String),

    /// The assistant API answered 2xx with a body that is not JSON.
    #[error("invalid upstream response: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    /// An outbound request body could not be encoded.
    #[error("failed to encode upstream request body: {0}")]
    RequestBody(#[source] serde_json::Error),

    /// An upstream URL could not be built from the configured base URL.
    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),
}

impl ProxyError {
    /// HTTP status returned to the caller for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Validation(_) => StatusCode::BAD_REQUEST,
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::NotFound => StatusCode::NOT_FOUND,
            ProxyError::Upstream { status, .. } | ProxyError::Body { status, .. } => *status,
            ProxyError::Configuration(_)
            | ProxyError::Transport(_)
            | ProxyError::InvalidResponse(_)
            | ProxyError::RequestBody(_)
            | ProxyError::InvalidUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value placed under the `error` key of the response envelope.
    pub fn payload(&self) -> Value {
        match self {
            ProxyError::Upstream { payload, .. } => payload.clone(),
            other => Value::String(other.to_string()),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.payload() });
        (self.status(), Json(body)).into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ProxyError>;
