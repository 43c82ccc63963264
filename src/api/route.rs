//! Route table for the proxied assistant operations.

use std::str::FromStr;

use axum::http::Method;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// One of the five proxied operations, named by its trailing path segment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Route {
    /// Create an empty conversation thread.
    CreateThread,
    /// Append a user message to a thread.
    AddMessage,
    /// Start an assistant run on a thread.
    CreateRun,
    /// Poll the status of a run.
    CheckRunStatus,
    /// List the most recent messages of a thread.
    GetMessages,
}

impl Route {
    /// Resolve a route from the last non-empty segment of a request path.
    pub fn from_path(path: &str) -> Option<Self> {
        let segment = path.trim_end_matches('/').rsplit('/').next()?;
        Route::from_str(segment).ok()
    }

    /// The only method this route accepts.
    pub fn method(&self) -> Method {
        match self {
            Route::CreateThread | Route::AddMessage | Route::CreateRun => Method::POST,
            Route::CheckRunStatus | Route::GetMessages => Method::GET,
        }
    }

    /// Static label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}
