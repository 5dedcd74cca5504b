//! Caller identity handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, MeResponse};
use crate::extractors::AuthPrincipal;
use crate::state::AppState;

/// GET /api/me
pub async fn me(State(state): State<AppState>, auth: AuthPrincipal) -> Json<ApiResponse<MeResponse>> {
    let tenant = state.tenants.resolve(auth.tenant_id());
    Json(ApiResponse::ok(MeResponse::new(auth.principal(), tenant)))
}
