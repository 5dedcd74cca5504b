//! Identity provider configuration.

use serde::{Deserialize, Serialize};

/// How inbound session credentials are verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    /// Ask the identity provider to verify the token and return the user.
    #[default]
    Remote,
    /// Verify the token signature locally with the provider's key material.
    Jwt,
}

/// Identity provider connection and session cookie settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Identity provider base URL.
    pub url: String,
    /// Public (anon) API key sent with every provider request.
    pub anon_key: String,
    /// Verification strategy.
    #[serde(default)]
    pub verification: VerificationMode,
    /// HMAC secret for `jwt` verification (HS256).
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// RSA public key in PEM format for `jwt` verification (RS256).
    #[serde(default)]
    pub jwt_public_key_pem: Option<String>,
    /// Expected `aud` claim.
    #[serde(default = "default_audience")]
    pub jwt_audience: String,
    /// Name of the cookie carrying the session.
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
    /// Whether refreshed session cookies carry the `Secure` attribute.
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
    /// Connect timeout for provider calls in milliseconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

fn default_audience() -> String {
    "authenticated".to_string()
}

fn default_session_cookie() -> String {
    "stratix-auth-token".to_string()
}

fn default_true() -> bool {
    true
}

fn default_connect_timeout() -> u64 {
    2_000
}
