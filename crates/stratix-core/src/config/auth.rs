//! Request gate configuration: login target, route tables and timeouts.

use serde::{Deserialize, Serialize};

/// What the gate does with paths that match neither route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnclassifiedPolicy {
    /// Let unmatched paths through without verification.
    #[default]
    Allow,
    /// Treat unmatched paths as protected.
    Protect,
}

/// Request gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Login page that unauthenticated visitors are redirected to.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Query parameter carrying the originally requested path.
    #[serde(default = "default_redirect_param")]
    pub redirect_param: String,
    /// Upper bound for a single session verification, in milliseconds.
    #[serde(default = "default_verify_timeout")]
    pub verify_timeout_ms: u64,
    /// Public path prefixes, checked first.
    #[serde(default = "default_public_prefixes")]
    pub public_prefixes: Vec<String>,
    /// Protected path prefixes, checked after the public ones.
    #[serde(default = "default_protected_prefixes")]
    pub protected_prefixes: Vec<String>,
    /// Policy for paths matching no prefix.
    #[serde(default)]
    pub unclassified_policy: UnclassifiedPolicy,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            redirect_param: default_redirect_param(),
            verify_timeout_ms: default_verify_timeout(),
            public_prefixes: default_public_prefixes(),
            protected_prefixes: default_protected_prefixes(),
            unclassified_policy: UnclassifiedPolicy::default(),
        }
    }
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}

fn default_redirect_param() -> String {
    "redirectTo".to_string()
}

fn default_verify_timeout() -> u64 {
    5_000
}

fn default_public_prefixes() -> Vec<String> {
    [
        "/auth",
        "/api/health",
        "/api/tenant/branding",
        "/api/assistant",
        "/favicon.ico",
        "/_next",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

fn default_protected_prefixes() -> Vec<String> {
    [
        "/dashboard",
        "/objectives",
        "/initiatives",
        "/analytics",
        "/settings",
        "/profile",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}
