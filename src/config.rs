//! Application configuration loaded from environment variables.

use serde::Deserialize;
use url::Url;

use crate::error::ProxyError;

/// Largest page size the Assistants API accepts for message listing.
pub const MAX_MESSAGES_LIMIT: u32 = 100;

/// Application configuration loaded from environment variables.
///
/// Built once at startup and shared read-only with every request.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === OpenAI Credentials ===
    /// Secret API key. Missing keys are reported per request, not at startup.
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Assistant that executes runs.
    #[serde(default)]
    pub openai_assistant_id: Option<String>,

    // === Upstream API ===
    /// Assistants API base URL.
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,

    /// Value of the `OpenAI-Beta` opt-in header.
    #[serde(default = "default_beta")]
    pub openai_beta: String,

    /// Page size used by get-messages.
    #[serde(default = "default_messages_limit")]
    pub messages_limit: u32,

    /// Outbound request timeout in milliseconds.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_ms: u64,

    // === Server Configuration ===
    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Start the Prometheus exporter.
    #[serde(default)]
    pub metrics_enabled: bool,

    /// Prometheus exporter port.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

/// Secrets needed to issue an outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Bearer token for the Assistants API.
    pub api_key: String,
    /// Assistant used by create-run.
    pub assistant_id: String,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_beta() -> String {
    "assistants=v2".to_string()
}

fn default_messages_limit() -> u32 {
    10
}

fn default_http_timeout() -> u64 {
    30_000
}

fn default_port() -> u16 {
    8080
}

fn default_metrics_port() -> u16 {
    9090
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_assistant_id: None,
            openai_base_url: default_base_url(),
            openai_beta: default_beta(),
            messages_limit: default_messages_limit(),
            http_timeout_ms: default_http_timeout(),
            port: default_port(),
            metrics_enabled: false,
            metrics_port: default_metrics_port(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    ///
    /// Credentials are not checked here; their absence is a per-request error.
    pub fn validate(&self) -> Result<(), String> {
        let base = Url::parse(&self.openai_base_url)
            .map_err(|e| format!("OPENAI_BASE_URL is not a valid URL: {}", e))?;

        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err("OPENAI_BASE_URL must be an http(s) URL".to_string());
        }

        if self.messages_limit == 0 || self.messages_limit > MAX_MESSAGES_LIMIT {
            return Err(format!(
                "MESSAGES_LIMIT must be between 1 and {}",
                MAX_MESSAGES_LIMIT
            ));
        }

        if self.http_timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Resolve the credentials for one request.
    pub fn credentials(&self) -> Result<Credentials, ProxyError> {
        let api_key = non_empty(&self.openai_api_key).ok_or_else(|| {
            ProxyError::Configuration("OpenAI API key is not configured".to_string())
        })?;

        let assistant_id = non_empty(&self.openai_assistant_id).ok_or_else(|| {
            ProxyError::Configuration("OpenAI Assistant ID is not configured".to_string())
        })?;

        Ok(Credentials {
            api_key: api_key.to_string(),
            assistant_id: assistant_id.to_string(),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
