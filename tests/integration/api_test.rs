//! Integration tests for the `/api` routes: identity, backend data and the
//! assistant webhook.

mod helpers;

use helpers::{NO_TENANT_TOKEN, TestApp, VALID_TOKEN, bearer, session_cookie};
use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.get("/api/health", &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["environment"], "development");
}

#[tokio::test]
async fn test_me_without_session_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app.get("/api/me", &[]).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.header("www-authenticate"), Some("Bearer"));
    assert_eq!(response.body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_me_with_invalid_token_is_unauthorized() {
    let app = TestApp::new().await;
    let auth = bearer("forged");

    let response = app.get("/api/me", &[("authorization", &auth)]).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.header("www-authenticate"), Some("Bearer"));
    assert_eq!(app.verifier.calls(), 1);
}

#[tokio::test]
async fn test_me_returns_verified_identity_and_tenant() {
    let app = TestApp::new().await;
    let cookie = session_cookie(VALID_TOKEN);

    let response = app.get("/api/me", &[("cookie", &cookie)]).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["user_id"], "u1");
    assert_eq!(data["email"], "ana@fema.example");
    assert_eq!(data["verified"], true);
    assert_eq!(data["tenant"]["id"], "fema");
    assert_eq!(data["tenant"]["name"], "FEMA Electricidad");
}

#[tokio::test]
async fn test_tenant_query_cannot_override_verified_tenant() {
    let app = TestApp::new().await;
    let cookie = session_cookie(VALID_TOKEN);

    let response = app
        .get("/api/tenant?tenant=siga", &[("cookie", &cookie), ("x-tenant-id", "siga")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["id"], "fema");
}

#[tokio::test]
async fn test_principal_without_tenant_gets_default_tenant() {
    let app = TestApp::new().await;
    let auth = bearer(NO_TENANT_TOKEN);

    let response = app.get("/api/tenant", &[("authorization", &auth)]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["id"], "stratix");
}

#[tokio::test]
async fn test_objectives_forward_token_and_verified_tenant() {
    let app = TestApp::new().await;
    let auth = bearer(VALID_TOKEN);

    let response = app
        .get("/api/objectives", &[("authorization", &auth), ("x-tenant-id", "siga")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let objective = &response.body["data"][0];
    assert_eq!(objective["id"], "o1");
    assert_eq!(objective["title"], "Grow recurring revenue");
    assert_eq!(objective["target_date"], "2026-12-31");
    assert_eq!(objective["seen_tenant"], "fema");
    assert_eq!(objective["seen_authorization"], format!("Bearer {VALID_TOKEN}"));
}

#[tokio::test]
async fn test_backend_failure_maps_to_bad_gateway() {
    let app = TestApp::new().await;
    let auth = bearer(VALID_TOKEN);

    let response = app.get("/api/statistics", &[("authorization", &auth)]).await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error"], "UPSTREAM_ERROR");
    assert_eq!(response.body["message"], "statistics view missing");
    assert_eq!(response.body["details"]["upstream_status"], 500);
}

#[tokio::test]
async fn test_undecodable_backend_body_maps_to_bad_gateway() {
    let app = TestApp::new().await;
    let auth = bearer(VALID_TOKEN);

    let response = app.get("/api/initiatives", &[("authorization", &auth)]).await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error"], "UPSTREAM_ERROR");
    assert_eq!(response.body["details"]["upstream_status"], 200);
}

#[tokio::test]
async fn test_missing_backend_resource_maps_to_not_found() {
    let app = TestApp::new().await;
    let auth = bearer(VALID_TOKEN);

    let response = app.get("/api/areas", &[("authorization", &auth)]).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "relation \"areas\" does not exist");
    assert_eq!(response.body["details"]["upstream_status"], 404);
}

#[tokio::test]
async fn test_organization_settings_round_trip() {
    let app = TestApp::new().await;
    let auth = bearer(VALID_TOKEN);

    let current = app
        .get("/api/organization/settings", &[("authorization", &auth)])
        .await;
    assert_eq!(current.status, StatusCode::OK);
    assert_eq!(current.body["data"]["name"], "FEMA Electricidad");
    assert_eq!(current.body["data"]["seen_tenant"], "fema");

    let updated = app
        .request(
            "PATCH",
            "/api/organization/settings",
            &[("authorization", &auth)],
            Some(json!({ "timezone": "UTC" })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["timezone"], "UTC");
}

#[tokio::test]
async fn test_settings_patch_must_be_an_object() {
    let app = TestApp::new().await;
    let auth = bearer(VALID_TOKEN);

    let response = app
        .request(
            "PATCH",
            "/api/organization/settings",
            &[("authorization", &auth)],
            Some(json!(["timezone", "UTC"])),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_api_route_is_json_not_found() {
    let app = TestApp::new().await;

    let response = app.get("/api/does-not-exist", &[]).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_assistant_empty_body_is_bad_request() {
    let app = TestApp::new().await;

    let response = app.request("POST", "/api/assistant/webhook", &[], None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["fulfillmentResponse"]["messages"][0]["text"]["text"][0],
        "Error: No se recibieron datos"
    );
    assert_eq!(app.verifier.calls(), 0);
}

#[tokio::test]
async fn test_assistant_webhook_company_overview() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/assistant/webhook",
            &[],
            Some(json!({ "fulfillmentInfo": { "tag": "company_overview" } })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["fulfillmentResponse"]["messages"][0]["text"]["text"][0],
        "La empresa tiene 12 iniciativas, 3 completadas y un progreso general del 40%."
    );
}

#[tokio::test]
async fn test_assistant_tool_call_returns_enriched_output() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/assistant/webhook",
            &[],
            Some(json!({
                "tool": "projects/p/tools/stratix",
                "tool_parameters": { "action": "company_overview" }
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let output = &response.body["tool_output"][0]["output"];
    assert_eq!(output["link"], "https://stratix.example/dashboard");
    assert_eq!(output["company_metrics"]["total_initiatives"], 12);
}

#[tokio::test]
async fn test_assistant_key_is_enforced_when_configured() {
    let app = TestApp::with_config(|c| c.assistant.webhook_secret = Some("s3cret".to_string())).await;
    let body = json!({ "fulfillmentInfo": { "tag": "company_overview" } });

    let rejected = app
        .request("POST", "/api/assistant/webhook", &[], Some(body.clone()))
        .await;
    assert_eq!(rejected.status, StatusCode::FORBIDDEN);

    let wrong = app
        .request(
            "POST",
            "/api/assistant/webhook",
            &[("x-assistant-key", "s3creT")],
            Some(body.clone()),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::FORBIDDEN);

    let accepted = app
        .request(
            "POST",
            "/api/assistant/webhook",
            &[("x-assistant-key", "s3cret")],
            Some(body),
        )
        .await;
    assert_eq!(accepted.status, StatusCode::OK);
}
