//! Request gate middleware.
//!
//! Translates a [`GateDecision`] into HTTP:
//!
//! - `Allow` runs the inner service.
//! - `PassthroughWithIdentity` attaches the principal to the request
//!   (extensions and `x-user-id` / `x-user-email` headers), runs the inner
//!   service and repeats the identity headers on the response.
//! - `RedirectToLogin` answers `307` to the login page carrying the original
//!   path; under `/api` it answers `401` instead.
//!
//! On every branch the cookie mutations made during verification are
//! written as `Set-Cookie`.
//!
//! Paths that are not canonical (dot segments, doubled or encoded
//! separators) are refused with `400` before classification, so the path
//! that is classified is the path that is served.

use std::sync::{Arc, Mutex};

use axum::extract::{OriginalUri, Request, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use stratix_auth::principal::{USER_EMAIL_HEADER, USER_ID_HEADER};
use stratix_auth::{
    GateDecision, PendingCookies, Principal, SessionCredentials, is_canonical_path, login_redirect,
};
use stratix_backend::client::TENANT_HEADER;
use stratix_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::AuthPrincipal;
use crate::state::AppState;

/// Headers only the gateway may set; inbound copies are dropped.
const TRUSTED_HEADERS: [&str; 3] = [USER_ID_HEADER, USER_EMAIL_HEADER, TENANT_HEADER];

/// Cookie mutations produced after the gate decision (by extractors that
/// verify on their own), written to the response by the gate.
#[derive(Debug, Clone, Default)]
pub struct CookieSink(Arc<Mutex<PendingCookies>>);

impl CookieSink {
    pub fn merge(&self, cookies: PendingCookies) {
        let mut guard = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.merge(cookies);
    }

    pub fn take(&self) -> PendingCookies {
        let mut guard = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::take(&mut *guard)
    }
}

/// Gate middleware; installed with `from_fn_with_state`.
pub async fn request_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    for name in TRUSTED_HEADERS {
        request.headers_mut().remove(name);
    }

    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|u| u.0.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    if !is_canonical_path(&path) {
        tracing::warn!(path = %path, "Refusing non-canonical request path");
        return ApiError(AppError::validation("Request path is not canonical")).into_response();
    }

    let cookie_name = state.config.identity.session_cookie.as_str();
    let credentials = SessionCredentials::from_headers(request.headers(), cookie_name);
    let mut pending = PendingCookies::new();

    let decision = state.gate.evaluate(&path, &credentials, &mut pending).await;

    let sink = CookieSink::default();
    request.extensions_mut().insert(sink.clone());

    let mut response = match decision {
        GateDecision::Allow => next.run(request).await,
        GateDecision::PassthroughWithIdentity(principal) => {
            let identity = identity_headers(&principal);
            for (name, value) in &identity {
                request.headers_mut().insert(name.clone(), value.clone());
            }

            let access_token = pending
                .refreshed_session(cookie_name)
                .as_ref()
                .unwrap_or(&credentials)
                .access_token()
                .map(str::to_string);
            if let Some(token) = access_token {
                request
                    .extensions_mut()
                    .insert(AuthPrincipal::new(principal.clone(), token));
            }
            request.extensions_mut().insert(principal);

            let mut response = next.run(request).await;
            for (name, value) in identity {
                response.headers_mut().insert(name, value);
            }
            response
        }
        GateDecision::RedirectToLogin { original_path } => {
            if is_api_path(&original_path) {
                ApiError(AppError::authentication("A verified session is required")).into_response()
            } else {
                let target = login_redirect(
                    &state.config.auth.login_path,
                    &state.config.auth.redirect_param,
                    &original_path,
                );
                Redirect::temporary(&target).into_response()
            }
        }
    };

    pending.merge(sink.take());
    append_cookies(response.headers_mut(), &pending);
    response
}

/// `x-user-id` and `x-user-email` for `principal`. Values that are not
/// valid header text are skipped.
fn identity_headers(principal: &Principal) -> Vec<(HeaderName, HeaderValue)> {
    let mut headers = Vec::with_capacity(2);
    for (name, value) in [
        (USER_ID_HEADER, principal.user_id.as_str()),
        (USER_EMAIL_HEADER, principal.email.as_str()),
    ] {
        match HeaderValue::from_str(value) {
            Ok(v) => headers.push((HeaderName::from_static(name), v)),
            Err(_) => tracing::warn!(
                header = name,
                user_id = %principal.user_id,
                "Identity value is not a valid header, skipping"
            ),
        }
    }
    headers
}

fn append_cookies(headers: &mut HeaderMap, pending: &PendingCookies) {
    for value in pending.header_values() {
        headers.append(SET_COOKIE, value);
    }
}

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}
