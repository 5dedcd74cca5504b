//! Upstream service configuration: backend REST API and rendering frontend.

use serde::{Deserialize, Serialize};

/// Backend REST API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend REST API.
    pub base_url: String,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// Total request timeout in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

/// Rendering frontend that page requests are forwarded to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Frontend base URL. Page forwarding is disabled when unset.
    #[serde(default)]
    pub url: Option<String>,
    /// Total request timeout in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            url: None,
            request_timeout_ms: default_request_timeout(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    2_000
}

fn default_request_timeout() -> u64 {
    15_000
}
