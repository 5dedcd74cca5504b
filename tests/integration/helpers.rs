//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Json;
use axum::routing::{get, post};
use axum::{Router, http::Method, http::Uri};
use http::{HeaderMap, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use stratix_api::{AppState, build_router};
use stratix_auth::credentials::StoredSession;
use stratix_auth::{AuthError, PendingCookies, Principal, SessionCredentials, SessionVerifier};
use stratix_core::config::AppConfig;

/// Token the stub verifier accepts for user `u1` of tenant `fema`.
pub const VALID_TOKEN: &str = "valid-token";
/// Token accepted for user `u2`, who has no tenant assignment.
pub const NO_TENANT_TOKEN: &str = "no-tenant-token";
/// Token the stub verifier treats as expired; it clears the session cookie.
pub const EXPIRED_TOKEN: &str = "expired-token";
/// Token the stub verifier refreshes into [`FRESH_TOKEN`].
pub const REFRESH_TOKEN: &str = "stale-but-refreshable";
pub const FRESH_TOKEN: &str = "fresh-token";

pub const SESSION_COOKIE: &str = "stratix-auth-token";

/// Verifier with a fixed token table that counts its calls.
#[derive(Debug, Default)]
pub struct StubVerifier {
    calls: AtomicUsize,
}

impl StubVerifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionVerifier for StubVerifier {
    async fn verify(
        &self,
        credentials: &SessionCredentials,
        pending: &mut PendingCookies,
    ) -> Result<Principal, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match credentials.access_token() {
            None => Err(AuthError::MissingCredentials),
            Some(VALID_TOKEN) | Some(FRESH_TOKEN) => {
                Ok(Principal::new("u1", "ana@fema.example", true).with_tenant("fema"))
            }
            Some(NO_TENANT_TOKEN) => Ok(Principal::new("u2", "luis@example.com", true)),
            Some(EXPIRED_TOKEN) => {
                pending.clear_session(credentials.cookie_name());
                Err(AuthError::Expired)
            }
            Some(REFRESH_TOKEN) => {
                let session = StoredSession {
                    access_token: FRESH_TOKEN.to_string(),
                    refresh_token: Some("next-refresh".to_string()),
                    expires_at: None,
                    token_type: Some("bearer".to_string()),
                };
                pending.set_session(credentials.cookie_name(), &session, true);
                Ok(Principal::new("u1", "ana@fema.example", true).with_tenant("fema"))
            }
            Some(other) => Err(AuthError::InvalidCredentials(format!("unknown token {other}"))),
        }
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Verifier shared with the router
    pub verifier: Arc<StubVerifier>,
    /// Stub upstream serving backend, edge function and frontend
    pub upstream: SocketAddr,
}

/// Response captured from the router.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(http::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect()
    }
}

impl TestApp {
    /// App wired to a fresh stub upstream.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// App wired to a fresh stub upstream, with `adjust` applied to the
    /// parsed configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let upstream = spawn_upstream().await;
        let source = format!(
            r#"
[identity]
url = "http://{upstream}/identity"
anon_key = "anon"

[backend]
base_url = "http://{upstream}/rest"

[frontend]
url = "http://{upstream}"

[assistant]
edge_function_url = "http://{upstream}/functions/assistant"
platform_url = "https://stratix.example"
"#
        );

        let mut config = AppConfig::from_toml(&source).expect("test config");
        adjust(&mut config);
        let verifier = Arc::new(StubVerifier::default());
        let state = AppState::with_verifier(config, verifier.clone()).expect("app state");

        Self {
            router: build_router(state),
            verifier,
            upstream,
        }
    }

    /// Sends one request through the full middleware stack.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize body"))
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            text,
            body,
        }
    }

    pub async fn get(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.request("GET", path, headers, None).await
    }
}

/// `Cookie` header value carrying `token` as the session.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}")
}

/// `Authorization` header value for `token`.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Starts the stub upstream on an ephemeral port.
async fn spawn_upstream() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub upstream");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, upstream_router()).await;
    });
    addr
}

fn upstream_router() -> Router {
    Router::new()
        .route("/rest/objectives", get(objectives))
        .route("/rest/initiatives", get(malformed_initiatives))
        .route("/rest/statistics", get(failing_statistics))
        .route("/rest/areas", get(missing_areas))
        .route(
            "/rest/organization/settings",
            get(settings).patch(update_settings),
        )
        .route("/functions/assistant", post(edge_function))
        .fallback(frontend_echo)
}

fn header(headers: &HeaderMap, name: &str) -> Value {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| Value::String(v.to_string()))
        .unwrap_or(Value::Null)
}

async fn objectives(headers: HeaderMap) -> Json<Value> {
    Json(json!({
        "data": [{
            "id": "o1",
            "title": "Grow recurring revenue",
            "progress": 40.0,
            "target_date": "2026-12-31",
            "seen_tenant": header(&headers, "x-tenant-id"),
            "seen_authorization": header(&headers, "authorization"),
        }]
    }))
}

/// A 2xx listing whose date does not parse.
async fn malformed_initiatives() -> Json<Value> {
    Json(json!({
        "data": [{ "id": "i1", "title": "Launch portal", "target_date": "end of Q4" }]
    }))
}

async fn failing_statistics() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "statistics view missing" })),
    )
}

async fn missing_areas() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": { "message": "relation \"areas\" does not exist" } })),
    )
}

async fn settings(headers: HeaderMap) -> Json<Value> {
    Json(json!({
        "name": "FEMA Electricidad",
        "timezone": "America/Argentina/Buenos_Aires",
        "seen_tenant": header(&headers, "x-tenant-id"),
    }))
}

async fn update_settings(Json(patch): Json<Value>) -> Json<Value> {
    let mut stored = json!({ "name": "FEMA Electricidad" });
    if let (Some(target), Some(source)) = (stored.as_object_mut(), patch.as_object()) {
        for (k, v) in source {
            target.insert(k.clone(), v.clone());
        }
    }
    Json(stored)
}

async fn edge_function(headers: HeaderMap, Json(payload): Json<Value>) -> Json<Value> {
    if header(&headers, "apikey") != json!("anon") {
        return Json(json!({ "success": false, "error": "missing apikey" }));
    }
    match payload["action"].as_str() {
        Some("get_company_overview") => Json(json!({
            "success": true,
            "data": {
                "company_metrics": {
                    "total_initiatives": 12,
                    "completed_initiatives": 3,
                    "overall_progress": 40
                }
            }
        })),
        other => Json(json!({
            "success": false,
            "error": format!("unhandled action {other:?}")
        })),
    }
}

/// Echoes what the frontend would see.
async fn frontend_echo(method: Method, uri: Uri, headers: HeaderMap) -> Json<Value> {
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "user_id": header(&headers, "x-user-id"),
        "user_email": header(&headers, "x-user-email"),
        "tenant_id": header(&headers, "x-tenant-id"),
        "forwarded_host": header(&headers, "x-forwarded-host"),
    }))
}
