//! Conversational assistant webhook.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde_json::Value;
use subtle::ConstantTimeEq;

use stratix_core::error::AppError;

use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the shared webhook secret.
pub const ASSISTANT_KEY_HEADER: &str = "x-assistant-key";

/// POST /api/assistant/webhook
///
/// Accepts both the agent webhook format and the direct tool format. A body
/// that is not JSON is treated like an empty one.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    if let Some(secret) = state.config.assistant.webhook_secret.as_deref() {
        let presented = headers
            .get(ASSISTANT_KEY_HEADER)
            .map(|v| v.as_bytes())
            .unwrap_or_default();
        if !key_matches(presented, secret) {
            tracing::warn!("Assistant webhook called without a valid key");
            return Err(AppError::authorization("Invalid assistant key").into());
        }
    }

    let payload = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };

    let reply = state.assistant.handle(&payload).await;
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::OK);
    Ok((status, Json(reply.body)))
}

/// Constant-time comparison of the presented key with the configured one.
fn key_matches(presented: &[u8], secret: &str) -> bool {
    presented.ct_eq(secret.as_bytes()).into()
}
