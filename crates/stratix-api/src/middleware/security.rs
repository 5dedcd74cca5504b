//! Security response headers, stamped on every response by the outermost
//! middleware layer.

use axum::http::header::{
    CONTENT_SECURITY_POLICY, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS,
    X_FRAME_OPTIONS,
};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use stratix_core::config::AppConfig;
use stratix_core::error::AppError;

use crate::state::AppState;

const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

/// Precomputed set of security headers.
///
/// Always: anti-framing, no content sniffing, referrer policy, permissions
/// policy. Production only: HSTS and the configured CSP.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl SecurityHeaders {
    /// Builds the header set, failing on a CSP that is not a valid header
    /// value.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let mut headers = vec![
            (X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
            (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
            (
                REFERRER_POLICY,
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            ),
            (
                PERMISSIONS_POLICY,
                HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
            ),
        ];

        if config.is_production() {
            let hsts = format!(
                "max-age={}; includeSubDomains",
                config.security.hsts_max_age_seconds
            );
            let hsts = HeaderValue::from_str(&hsts)
                .map_err(|_| AppError::configuration("Invalid HSTS max-age"))?;
            let csp = HeaderValue::from_str(&config.security.content_security_policy)
                .map_err(|_| {
                    AppError::configuration("security.content_security_policy is not a valid header value")
                })?;
            headers.push((STRICT_TRANSPORT_SECURITY, hsts));
            headers.push((CONTENT_SECURITY_POLICY, csp));
        }

        Ok(Self { headers })
    }

    /// Sets every header on `target`, replacing values set further in.
    pub fn apply(&self, target: &mut HeaderMap) {
        for (name, value) in &self.headers {
            target.insert(name.clone(), value.clone());
        }
    }
}

/// Applies the security headers to whatever the inner layers produced,
/// including CORS preflights and body-limit rejections.
pub async fn security_headers(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    state.security_headers.apply(response.headers_mut());
    response
}
