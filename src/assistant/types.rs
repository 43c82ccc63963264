//! Validated operations and the request bodies sent upstream.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::route::Route;
use crate::error::ProxyError;

/// A route together with its validated inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Create an empty thread.
    CreateThread,
    /// Append a user message.
    AddMessage {
        /// Target thread.
        thread_id: String,
        /// Message content, forwarded as-is (string or content parts).
        content: Value,
    },
    /// Start a run with the configured assistant.
    CreateRun {
        /// Target thread.
        thread_id: String,
    },
    /// Fetch one run.
    CheckRunStatus {
        /// Thread owning the run.
        thread_id: String,
        /// Run to inspect.
        run_id: String,
    },
    /// List recent messages.
    GetMessages {
        /// Target thread.
        thread_id: String,
    },
}

impl Operation {
    /// Build an operation from request fields (JSON body or query string).
    pub fn from_fields(route: Route, fields: &Map<String, Value>) -> Result<Self, ProxyError> {
        let thread_id = string_field(fields, "threadId");

        match route {
            Route::CreateThread => Ok(Operation::CreateThread),
            Route::AddMessage => {
                match (thread_id, present_field(fields, "content")) {
                    (Some(thread_id), Some(content)) => Ok(Operation::AddMessage {
                        thread_id,
                        content: content.clone(),
                    }),
                    _ => Err(missing("threadId and content are required")),
                }
            }
            Route::CreateRun => thread_id
                .map(|thread_id| Operation::CreateRun { thread_id })
                .ok_or_else(|| missing("threadId is required")),
            Route::CheckRunStatus => match (thread_id, string_field(fields, "runId")) {
                (Some(thread_id), Some(run_id)) => {
                    Ok(Operation::CheckRunStatus { thread_id, run_id })
                }
                _ => Err(missing("threadId and runId are required")),
            },
            Route::GetMessages => thread_id
                .map(|thread_id| Operation::GetMessages { thread_id })
                .ok_or_else(|| missing("threadId is required")),
        }
    }

    /// Route this operation was built for.
    pub fn route(&self) -> Route {
        match self {
            Operation::CreateThread => Route::CreateThread,
            Operation::AddMessage { .. } => Route::AddMessage,
            Operation::CreateRun { .. } => Route::CreateRun,
            Operation::CheckRunStatus { .. } => Route::CheckRunStatus,
            Operation::GetMessages { .. } => Route::GetMessages,
        }
    }

    /// Thread the operation targets, if any.
    pub fn thread_id(&self) -> Option<&str> {
        match self {
            Operation::CreateThread => None,
            Operation::AddMessage { thread_id, .. }
            | Operation::CreateRun { thread_id }
            | Operation::CheckRunStatus { thread_id, .. }
            | Operation::GetMessages { thread_id } => Some(thread_id),
        }
    }
}

/// Body of `POST /threads/{id}/messages`.
#[derive(Debug, Serialize)]
pub struct CreateMessageBody<'a> {
    /// Always `user`.
    pub role: &'static str,
    /// Message content.
    pub content: &'a Value,
}

/// Body of `POST /threads/{id}/runs`.
#[derive(Debug, Serialize)]
pub struct CreateRunBody<'a> {
    /// Assistant executing the run.
    pub assistant_id: &'a str,
}

fn missing(message: &str) -> ProxyError {
    ProxyError::Validation(message.to_string())
}

/// A field counts as present unless it is absent, null, false, zero or an
/// empty string.
fn present_field<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields.get(name).filter(|value| match value {
        Value::Null | Value::Bool(false) => false,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        _ => true,
    })
}

fn string_field(fields: &Map<String, Value>, name: &str) -> Option<String> {
    match present_field(fields, name)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
