//! The per-request gate decision.
//!
//! ```text
//! Start -> classify --Public------------------------------> Allow
//!                   --Unclassified (allow policy)---------> Allow
//!                   --Protected -> verify --ok------------> PassthroughWithIdentity
//!                                         --err / timeout-> RedirectToLogin
//! ```
//!
//! Nothing is cached between requests: every protected request is verified.

use std::sync::Arc;
use std::time::Duration;

use stratix_core::config::{GateConfig, UnclassifiedPolicy};

use crate::credentials::{PendingCookies, SessionCredentials};
use crate::error::AuthError;
use crate::principal::Principal;
use crate::routes::{RouteClass, RouteTable};
use crate::verifier::SessionVerifier;

/// Outcome of gating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Let the request through without identity.
    Allow,
    /// Send the visitor to the login page, remembering where they were going.
    RedirectToLogin {
        /// Path originally requested.
        original_path: String,
    },
    /// Let the request through with the verified identity attached.
    PassthroughWithIdentity(Principal),
}

/// Composes route classification and session verification.
#[derive(Debug, Clone)]
pub struct RequestGate {
    routes: RouteTable,
    unclassified: UnclassifiedPolicy,
    verifier: Arc<dyn SessionVerifier>,
    verify_timeout: Duration,
}

impl RequestGate {
    /// Creates a gate.
    pub fn new(
        routes: RouteTable,
        unclassified: UnclassifiedPolicy,
        verifier: Arc<dyn SessionVerifier>,
        verify_timeout: Duration,
    ) -> Self {
        Self {
            routes,
            unclassified,
            verifier,
            verify_timeout,
        }
    }

    /// Creates a gate from configuration.
    pub fn from_config(config: &GateConfig, verifier: Arc<dyn SessionVerifier>) -> Self {
        Self::new(
            RouteTable::from_config(config),
            config.unclassified_policy,
            verifier,
            Duration::from_millis(config.verify_timeout_ms),
        )
    }

    /// Classifies a path.
    pub fn classify(&self, path: &str) -> RouteClass {
        self.routes.classify(path)
    }

    /// Decides what to do with a request for `path`.
    ///
    /// Verification failures of any kind collapse into a redirect; the
    /// failure itself is only logged.
    pub async fn evaluate(
        &self,
        path: &str,
        credentials: &SessionCredentials,
        pending: &mut PendingCookies,
    ) -> GateDecision {
        let class = self.classify(path);
        let gated = match class {
            RouteClass::Public => false,
            RouteClass::Protected => true,
            RouteClass::Unclassified => self.unclassified == UnclassifiedPolicy::Protect,
        };

        if !gated {
            tracing::trace!(path = %path, class = %class, "Request allowed without verification");
            return GateDecision::Allow;
        }

        match self.verify(credentials, pending).await {
            Ok(principal) => {
                tracing::debug!(
                    path = %path,
                    user_id = %principal.user_id,
                    "Session verified"
                );
                GateDecision::PassthroughWithIdentity(principal)
            }
            Err(err) => {
                tracing::info!(
                    path = %path,
                    reason = err.label(),
                    error = %err,
                    "Session verification failed, redirecting to login"
                );
                GateDecision::RedirectToLogin {
                    original_path: path.to_string(),
                }
            }
        }
    }

    /// Runs the verifier, bounded by the configured timeout.
    ///
    /// Dropping the returned future abandons the outbound call; no shared
    /// state is touched until it completes.
    pub async fn verify(
        &self,
        credentials: &SessionCredentials,
        pending: &mut PendingCookies,
    ) -> Result<Principal, AuthError> {
        match tokio::time::timeout(
            self.verify_timeout,
            self.verifier.verify(credentials, pending),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(AuthError::Timeout(self.verify_timeout)),
        }
    }
}

/// Builds the login redirect target carrying the original path.
///
/// `login_redirect("/auth/login", "redirectTo", "/dashboard/areas")` yields
/// `/auth/login?redirectTo=%2Fdashboard%2Fareas`.
pub fn login_redirect(login_path: &str, param: &str, original_path: &str) -> String {
    let separator = if login_path.contains('?') { '&' } else { '?' };
    format!(
        "{login_path}{separator}{param}={}",
        urlencoding::encode(original_path)
    )
}
