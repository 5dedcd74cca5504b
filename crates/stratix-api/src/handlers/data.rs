//! Dashboard data handlers, proxied to the backend REST API with the
//! caller's token and verified tenant.

use axum::Json;
use axum::extract::State;
use serde_json::Value;

use stratix_backend::models::{Area, Initiative, Objective, OrganizationSettings, Statistics};
use stratix_core::error::AppError;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthPrincipal;
use crate::state::AppState;

/// GET /api/objectives
pub async fn objectives(
    State(state): State<AppState>,
    auth: AuthPrincipal,
) -> ApiResult<Json<ApiResponse<Vec<Objective>>>> {
    let items = state.backend.list_objectives(auth.caller()).await?;
    Ok(Json(ApiResponse::ok(items)))
}

/// GET /api/initiatives
pub async fn initiatives(
    State(state): State<AppState>,
    auth: AuthPrincipal,
) -> ApiResult<Json<ApiResponse<Vec<Initiative>>>> {
    let items = state.backend.list_initiatives(auth.caller()).await?;
    Ok(Json(ApiResponse::ok(items)))
}

/// GET /api/areas
pub async fn areas(
    State(state): State<AppState>,
    auth: AuthPrincipal,
) -> ApiResult<Json<ApiResponse<Vec<Area>>>> {
    let items = state.backend.list_areas(auth.caller()).await?;
    Ok(Json(ApiResponse::ok(items)))
}

/// GET /api/statistics
pub async fn statistics(
    State(state): State<AppState>,
    auth: AuthPrincipal,
) -> ApiResult<Json<ApiResponse<Statistics>>> {
    let stats = state.backend.statistics(auth.caller()).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// GET /api/organization/settings
pub async fn organization_settings(
    State(state): State<AppState>,
    auth: AuthPrincipal,
) -> ApiResult<Json<ApiResponse<OrganizationSettings>>> {
    let settings = state.backend.organization_settings(auth.caller()).await?;
    Ok(Json(ApiResponse::ok(settings)))
}

/// PATCH /api/organization/settings
pub async fn update_organization_settings(
    State(state): State<AppState>,
    auth: AuthPrincipal,
    Json(patch): Json<Value>,
) -> ApiResult<Json<ApiResponse<OrganizationSettings>>> {
    if !patch.is_object() {
        return Err(AppError::validation("Settings update must be a JSON object").into());
    }

    let settings = state
        .backend
        .update_organization_settings(auth.caller(), &patch)
        .await?;

    tracing::info!(
        user_id = %auth.user_id,
        tenant_id = auth.tenant_id().unwrap_or("-"),
        "Organization settings updated"
    );

    Ok(Json(ApiResponse::ok(settings)))
}
