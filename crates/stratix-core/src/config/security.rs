//! Security response header configuration.

use serde::{Deserialize, Serialize};

/// Values for the production-only security headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// `Content-Security-Policy` value sent in production.
    #[serde(default = "default_csp")]
    pub content_security_policy: String,
    /// `max-age` for `Strict-Transport-Security` in seconds.
    #[serde(default = "default_hsts_max_age")]
    pub hsts_max_age_seconds: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            content_security_policy: default_csp(),
            hsts_max_age_seconds: default_hsts_max_age(),
        }
    }
}

fn default_csp() -> String {
    "default-src 'self'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'; \
     img-src 'self' data: https:; connect-src 'self' https:; frame-ancestors 'none'"
        .to_string()
}

fn default_hsts_max_age() -> u64 {
    31_536_000
}
