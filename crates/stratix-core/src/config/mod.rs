//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate, overlaid with `STRATIX__`-prefixed environment variables.
//! Each sub-module represents a logical configuration section.

pub mod app;
pub mod assistant;
pub mod auth;
pub mod backend;
pub mod identity;
pub mod logging;
pub mod security;
pub mod tenant;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::assistant::AssistantConfig;
pub use self::auth::{GateConfig, UnclassifiedPolicy};
pub use self::backend::{BackendConfig, FrontendConfig};
pub use self::identity::{IdentityConfig, VerificationMode};
pub use self::logging::LoggingConfig;
pub use self::security::SecurityConfig;
pub use self::tenant::{TenantEntry, TenantsConfig, ThemeConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for `config/default.toml`, the
/// environment overlay `config/{env}.toml`, and environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment name. `"production"` enables strict
    /// transport and content-security headers.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Identity provider settings.
    pub identity: IdentityConfig,
    /// Request gate settings.
    #[serde(default)]
    pub auth: GateConfig,
    /// Backend REST API settings.
    pub backend: BackendConfig,
    /// Rendering frontend settings.
    #[serde(default)]
    pub frontend: FrontendConfig,
    /// Security response header settings.
    #[serde(default)]
    pub security: SecurityConfig,
    /// Static tenant table.
    #[serde(default)]
    pub tenants: TenantsConfig,
    /// Conversational assistant settings.
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files and the environment.
    ///
    /// Merges `config/default.toml`, `config/{env}.toml` and environment
    /// variables prefixed with `STRATIX__` (e.g. `STRATIX__BACKEND__BASE_URL`),
    /// then validates the result.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .set_default("environment", env)?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("STRATIX")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("auth.public_prefixes")
                    .with_list_parse_key("auth.protected_prefixes"),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string. Used by tests and tooling.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would start the server with undefined
    /// upstream endpoints.
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("backend.base_url", self.backend.base_url.as_str()),
            ("identity.url", self.identity.url.as_str()),
            ("identity.anon_key", self.identity.anon_key.as_str()),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::configuration(format!(
                    "Missing required configuration value '{key}'"
                )));
            }
        }

        if self.identity.verification == VerificationMode::Jwt
            && self.identity.jwt_secret.is_none()
            && self.identity.jwt_public_key_pem.is_none()
        {
            return Err(AppError::configuration(
                "JWT verification requires identity.jwt_secret or identity.jwt_public_key_pem",
            ));
        }

        if !self.auth.login_path.starts_with('/') {
            return Err(AppError::configuration(format!(
                "auth.login_path must be an absolute path, got '{}'",
                self.auth.login_path
            )));
        }

        Ok(())
    }

    /// Returns whether production-only hardening is enabled.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn default_environment() -> String {
    "development".to_string()
}
