//! Integration tests for the request gate: classification, verification,
//! redirects, identity forwarding and response hardening.

mod helpers;

use helpers::{
    EXPIRED_TOKEN, FRESH_TOKEN, REFRESH_TOKEN, SESSION_COOKIE, TestApp, VALID_TOKEN, bearer,
    session_cookie,
};
use http::StatusCode;
use stratix_core::config::UnclassifiedPolicy;

const ALWAYS_SET: [&str; 4] = [
    "x-frame-options",
    "x-content-type-options",
    "referrer-policy",
    "permissions-policy",
];

fn assert_security_headers(response: &helpers::TestResponse) {
    for name in ALWAYS_SET {
        assert!(
            response.header(name).is_some(),
            "missing {name} on {} response",
            response.status
        );
    }
    assert_eq!(response.header("x-frame-options"), Some("DENY"));
    assert_eq!(response.header("x-content-type-options"), Some("nosniff"));
}

#[tokio::test]
async fn test_public_path_is_forwarded_without_verification() {
    let app = TestApp::new().await;

    let response = app.get("/auth/login", &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["path"], "/auth/login");
    assert!(response.body["user_id"].is_null());
    assert_eq!(app.verifier.calls(), 0);
    assert_security_headers(&response);
}

#[tokio::test]
async fn test_protected_path_without_session_redirects_to_login() {
    let app = TestApp::new().await;

    let response = app.get("/dashboard", &[]).await;

    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.header("location"),
        Some("/auth/login?redirectTo=%2Fdashboard")
    );
    assert_security_headers(&response);
}

#[tokio::test]
async fn test_nested_protected_path_keeps_full_path_in_redirect() {
    let app = TestApp::new().await;

    let response = app.get("/dashboard/areas", &[]).await;

    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.header("location"),
        Some("/auth/login?redirectTo=%2Fdashboard%2Fareas")
    );
}

#[tokio::test]
async fn test_valid_session_passes_identity_to_frontend_and_response() {
    let app = TestApp::new().await;
    let cookie = session_cookie(VALID_TOKEN);

    let response = app.get("/dashboard/areas", &[("cookie", &cookie)]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["path"], "/dashboard/areas");
    assert_eq!(response.body["user_id"], "u1");
    assert_eq!(response.body["user_email"], "ana@fema.example");
    assert_eq!(response.body["tenant_id"], "fema");
    assert_eq!(response.header("x-user-id"), Some("u1"));
    assert_eq!(response.header("x-user-email"), Some("ana@fema.example"));
    assert_security_headers(&response);
}

#[tokio::test]
async fn test_bearer_header_is_accepted_on_pages() {
    let app = TestApp::new().await;
    let auth = bearer(VALID_TOKEN);

    let response = app.get("/objectives", &[("authorization", &auth)]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user_id"], "u1");
}

#[tokio::test]
async fn test_every_protected_request_is_reverified() {
    let app = TestApp::new().await;
    let cookie = session_cookie(VALID_TOKEN);

    app.get("/dashboard", &[("cookie", &cookie)]).await;
    app.get("/dashboard", &[("cookie", &cookie)]).await;

    assert_eq!(app.verifier.calls(), 2);
}

#[tokio::test]
async fn test_expired_session_redirects_and_clears_cookie() {
    let app = TestApp::new().await;
    let cookie = session_cookie(EXPIRED_TOKEN);

    let response = app.get("/settings", &[("cookie", &cookie)]).await;

    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.header("location"),
        Some("/auth/login?redirectTo=%2Fsettings")
    );
    let cookies = response.set_cookies();
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with(&format!("{SESSION_COOKIE}=;")));
}

#[tokio::test]
async fn test_refreshed_session_is_written_back() {
    let app = TestApp::new().await;
    let cookie = session_cookie(REFRESH_TOKEN);

    let response = app.get("/profile", &[("cookie", &cookie)]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user_id"], "u1");
    let cookies = response.set_cookies();
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with(&format!("{SESSION_COOKIE}=base64-")));
    assert!(cookies[0].contains("HttpOnly"));
}

#[tokio::test]
async fn test_refreshed_token_is_used_for_backend_calls() {
    let app = TestApp::with_config(|c| {
        c.auth.protected_prefixes = vec!["/api/objectives".to_string()];
    })
    .await;
    let cookie = session_cookie(REFRESH_TOKEN);

    let response = app.get("/api/objectives", &[("cookie", &cookie)]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["data"][0]["seen_authorization"],
        format!("Bearer {FRESH_TOKEN}")
    );
    assert_eq!(app.verifier.calls(), 1);
}

#[tokio::test]
async fn test_spoofed_identity_headers_are_stripped() {
    let app = TestApp::new().await;

    let response = app
        .get(
            "/auth/callback",
            &[
                ("x-user-id", "admin"),
                ("x-user-email", "root@example.com"),
                ("x-tenant-id", "siga"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["user_id"].is_null());
    assert!(response.body["user_email"].is_null());
    assert!(response.body["tenant_id"].is_null());
    assert!(response.header("x-user-id").is_none());
}

#[tokio::test]
async fn test_dot_segments_cannot_escape_a_public_prefix() {
    let app = TestApp::new().await;

    for path in [
        "/auth/../dashboard",
        "/auth/../dashboard/areas",
        "/auth/%2e%2e/settings",
        "/auth/%2E%2e/dashboard/areas",
        "/_next/../settings",
        "/auth/./../profile",
        "/auth//dashboard",
    ] {
        let response = app.get(path, &[]).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(response.body["error"], "VALIDATION_ERROR", "{path}");
        assert!(response.body["path"].is_null(), "{path} reached the frontend");
        assert_security_headers(&response);
    }
    assert_eq!(app.verifier.calls(), 0);
}

#[tokio::test]
async fn test_dot_segments_are_refused_even_with_a_session() {
    let app = TestApp::new().await;
    let cookie = session_cookie(VALID_TOKEN);

    let response = app.get("/dashboard/../auth/login", &[("cookie", &cookie)]).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.set_cookies().is_empty());
}

#[tokio::test]
async fn test_cors_preflight_carries_security_headers() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "OPTIONS",
            "/dashboard",
            &[
                ("origin", "http://localhost:3000"),
                ("access-control-request-method", "GET"),
            ],
            None,
        )
        .await;

    assert_security_headers(&response);
    assert_eq!(app.verifier.calls(), 0);
}

#[tokio::test]
async fn test_production_preflight_carries_transport_policy() {
    let app = TestApp::with_config(|c| c.environment = "production".to_string()).await;

    let response = app
        .request(
            "OPTIONS",
            "/api/me",
            &[
                ("origin", "http://localhost:3000"),
                ("access-control-request-method", "GET"),
            ],
            None,
        )
        .await;

    assert_security_headers(&response);
    assert!(response.header("strict-transport-security").is_some());
}

#[tokio::test]
async fn test_oversized_body_rejection_carries_security_headers() {
    let app = TestApp::with_config(|c| c.server.max_body_bytes = 16).await;
    let body = serde_json::json!({ "fulfillmentInfo": { "tag": "company_overview" } });
    let length = serde_json::to_vec(&body).unwrap().len().to_string();

    let response = app
        .request(
            "POST",
            "/api/assistant/webhook",
            &[("content-length", &length)],
            Some(body),
        )
        .await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_security_headers(&response);
}

#[tokio::test]
async fn test_unclassified_path_is_allowed_by_default() {
    let app = TestApp::new().await;

    let response = app.get("/pricing", &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.verifier.calls(), 0);
}

#[tokio::test]
async fn test_unclassified_path_is_gated_when_configured() {
    let app = TestApp::with_config(|c| c.auth.unclassified_policy = UnclassifiedPolicy::Protect).await;

    let response = app.get("/pricing", &[]).await;

    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.header("location"),
        Some("/auth/login?redirectTo=%2Fpricing")
    );
}

#[tokio::test]
async fn test_gated_api_path_answers_unauthorized_instead_of_redirect() {
    let app = TestApp::with_config(|c| c.auth.unclassified_policy = UnclassifiedPolicy::Protect).await;

    let response = app.get("/api/me", &[]).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.header("www-authenticate"), Some("Bearer"));
    assert!(response.header("location").is_none());
    assert_security_headers(&response);
}

#[tokio::test]
async fn test_production_adds_transport_and_content_policies() {
    let app = TestApp::with_config(|c| c.environment = "production".to_string()).await;

    let response = app.get("/api/health", &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header("strict-transport-security"),
        Some("max-age=31536000; includeSubDomains")
    );
    assert!(response.header("content-security-policy").is_some());
    assert_security_headers(&response);
}

#[tokio::test]
async fn test_development_omits_transport_and_content_policies() {
    let app = TestApp::new().await;

    let response = app.get("/api/health", &[]).await;

    assert!(response.header("strict-transport-security").is_none());
    assert!(response.header("content-security-policy").is_none());
}

#[tokio::test]
async fn test_request_id_is_generated_and_echoed() {
    let app = TestApp::new().await;

    let generated = app.get("/api/health", &[]).await;
    assert!(generated.header("x-request-id").is_some());

    let echoed = app.get("/api/health", &[("x-request-id", "req-42")]).await;
    assert_eq!(echoed.header("x-request-id"), Some("req-42"));
}
