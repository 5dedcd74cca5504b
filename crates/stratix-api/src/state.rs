//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::{Duration, Instant};

use stratix_auth::verifier::build_verifier;
use stratix_auth::{RequestGate, SessionVerifier};
use stratix_backend::{AssistantService, BackendClient};
use stratix_core::config::AppConfig;
use stratix_core::AppResult;
use stratix_tenant::{PresentationContexts, TenantRegistry};

use crate::frontend::FrontendProxy;
use crate::middleware::security::SecurityHeaders;

/// Application state containing all shared dependencies.
///
/// Built once at startup and passed to every handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Auth ─────────────────────────────────────────────────
    /// Session verifier shared by the gate and the API extractor
    pub verifier: Arc<dyn SessionVerifier>,
    /// Route classification + verification
    pub gate: Arc<RequestGate>,

    // ── Tenancy ──────────────────────────────────────────────
    /// Static tenant table
    pub tenants: Arc<TenantRegistry>,
    /// Per-tenant presentation contexts
    pub presentation: Arc<PresentationContexts>,

    // ── Upstreams ────────────────────────────────────────────
    /// Backend REST API client
    pub backend: Arc<BackendClient>,
    /// Assistant webhook service
    pub assistant: Arc<AssistantService>,
    /// Rendering frontend, when page forwarding is enabled
    pub frontend: Option<Arc<FrontendProxy>>,

    // ── Response hardening ───────────────────────────────────
    /// Security headers stamped on every response
    pub security_headers: Arc<SecurityHeaders>,

    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Builds the state with the verifier selected by configuration.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let verifier = build_verifier(
            &config.identity,
            Duration::from_millis(config.auth.verify_timeout_ms),
        )?;
        Self::with_verifier(config, verifier)
    }

    /// Builds the state around an existing verifier.
    pub fn with_verifier(
        config: AppConfig,
        verifier: Arc<dyn SessionVerifier>,
    ) -> AppResult<Self> {
        let gate = Arc::new(RequestGate::from_config(&config.auth, Arc::clone(&verifier)));

        let tenants = Arc::new(TenantRegistry::from_config(&config.tenants));
        let presentation = Arc::new(PresentationContexts::for_registry(&tenants));

        let backend = Arc::new(BackendClient::new(&config.backend)?);
        let assistant = Arc::new(AssistantService::from_config(
            &config.assistant,
            &config.identity.anon_key,
        )?);
        let frontend = match config.frontend.url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => Some(Arc::new(FrontendProxy::new(
                url,
                Duration::from_millis(config.frontend.request_timeout_ms),
                config.server.max_body_bytes,
            )?)),
            None => None,
        };

        let security_headers = Arc::new(SecurityHeaders::from_config(&config)?);

        tracing::info!(
            environment = %config.environment,
            backend = %backend.base_url(),
            page_forwarding = frontend.is_some(),
            "Application state initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            verifier,
            gate,
            tenants,
            presentation,
            backend,
            assistant,
            frontend,
            security_headers,
            started_at: Instant::now(),
        })
    }
}
