//! Integration tests for tenant resolution and theme application.

mod helpers;

use helpers::{NO_TENANT_TOKEN, TestApp, VALID_TOKEN, bearer};
use http::StatusCode;

#[tokio::test]
async fn test_branding_by_query() {
    let app = TestApp::new().await;

    let response = app.get("/api/tenant/branding?tenant=siga", &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["id"], "siga");
    assert_eq!(data["name"], "SIGA Turismo");
    assert_eq!(data["theme"]["primary"], "#00a651");
    assert_eq!(app.verifier.calls(), 0);
}

#[tokio::test]
async fn test_branding_unknown_tenant_falls_back_to_default() {
    let app = TestApp::new().await;

    let response = app.get("/api/tenant/branding?tenant=acme", &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["id"], "stratix");
    assert_eq!(response.body["data"]["name"], "Stratix Platform");
}

#[tokio::test]
async fn test_branding_by_host() {
    let app = TestApp::new().await;

    let by_label = app
        .get("/api/tenant/branding", &[("host", "fema.example.com:8443")])
        .await;
    assert_eq!(by_label.body["data"]["id"], "fema");

    let by_domain = app
        .get("/api/tenant/branding", &[("host", "Stratix-Platform.vercel.app")])
        .await;
    assert_eq!(by_domain.body["data"]["id"], "stratix");

    let unknown = app
        .get("/api/tenant/branding", &[("host", "localhost:8080")])
        .await;
    assert_eq!(unknown.body["data"]["id"], "stratix");
}

#[tokio::test]
async fn test_query_wins_over_host() {
    let app = TestApp::new().await;

    let response = app
        .get("/api/tenant/branding?tenant=siga", &[("host", "fema.example.com")])
        .await;

    assert_eq!(response.body["data"]["id"], "siga");
}

#[tokio::test]
async fn test_theme_stylesheet_for_verified_tenant() {
    let app = TestApp::new().await;
    let auth = bearer(VALID_TOKEN);

    let response = app.get("/api/tenant/theme.css", &[("authorization", &auth)]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), Some("text/css; charset=utf-8"));
    assert_eq!(response.header("cache-control"), Some("private, no-store"));
    assert!(response.text.starts_with(":root[data-tenant=\"fema\"], :root {"));
    assert!(response.text.contains("--tenant-primary: #00539f;"));
    assert!(response.text.contains("--tenant-secondary: #ffc72c;"));
}

#[tokio::test]
async fn test_theme_stylesheet_is_stable_and_isolated_per_tenant() {
    let app = TestApp::new().await;
    let fema = bearer(VALID_TOKEN);
    let default = bearer(NO_TENANT_TOKEN);

    let first = app.get("/api/tenant/theme.css", &[("authorization", &fema)]).await;
    let other = app.get("/api/tenant/theme.css", &[("authorization", &default)]).await;
    let again = app.get("/api/tenant/theme.css", &[("authorization", &fema)]).await;

    assert_eq!(first.text, again.text);
    assert!(other.text.starts_with(":root[data-tenant=\"stratix\"], :root {"));
    assert!(other.text.contains("--tenant-primary: #6366f1;"));
    assert!(!other.text.contains("#00539f"));
}

#[tokio::test]
async fn test_theme_stylesheet_requires_session() {
    let app = TestApp::new().await;

    let response = app.get("/api/tenant/theme.css", &[]).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.header("www-authenticate"), Some("Bearer"));
}
