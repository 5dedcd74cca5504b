//! `AuthPrincipal` extractor: the verified caller of an API route.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use stratix_auth::{AuthError, PendingCookies, Principal, SessionCredentials};
use stratix_backend::CallerContext;

use crate::error::ApiError;
use crate::middleware::gate::CookieSink;
use crate::state::AppState;

/// Verified caller plus the access token to forward upstream.
///
/// Reuses the identity the gate attached to this request; otherwise the
/// session is verified here. Failure rejects with `401` and
/// `WWW-Authenticate: Bearer`.
#[derive(Debug, Clone)]
pub struct AuthPrincipal {
    principal: Principal,
    access_token: String,
}

impl AuthPrincipal {
    pub fn new(principal: Principal, access_token: impl Into<String>) -> Self {
        Self {
            principal,
            access_token: access_token.into(),
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Tenant from the verified principal; never from the request.
    pub fn tenant_id(&self) -> Option<&str> {
        self.principal.tenant_id.as_deref()
    }

    /// Context forwarded on backend calls made for this caller.
    pub fn caller(&self) -> CallerContext<'_> {
        CallerContext {
            access_token: &self.access_token,
            tenant_id: self.tenant_id(),
        }
    }
}

impl std::ops::Deref for AuthPrincipal {
    type Target = Principal;
    fn deref(&self) -> &Self::Target {
        &self.principal
    }
}

impl FromRequestParts<AppState> for AuthPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(existing) = parts.extensions.get::<AuthPrincipal>() {
            return Ok(existing.clone());
        }

        let cookie_name = &state.config.identity.session_cookie;
        let credentials = SessionCredentials::from_headers(&parts.headers, cookie_name);
        if !credentials.is_present() {
            return Err(AuthError::MissingCredentials.into());
        }

        let mut pending = PendingCookies::new();
        let result = state.gate.verify(&credentials, &mut pending).await;

        let access_token = pending
            .refreshed_session(cookie_name)
            .as_ref()
            .unwrap_or(&credentials)
            .access_token()
            .map(str::to_string);

        if let Some(sink) = parts.extensions.get::<CookieSink>() {
            sink.merge(pending);
        }

        let principal = result.inspect_err(|err| {
            tracing::debug!(reason = err.label(), error = %err, "API request rejected");
        })?;

        let auth = Self::new(
            principal,
            access_token.ok_or(AuthError::MissingCredentials)?,
        );
        parts.extensions.insert(auth.clone());
        Ok(auth)
    }
}
