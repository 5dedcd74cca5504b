//! Tenant branding and theme handlers.
//!
//! Branding is public and display-only, so it may be selected by query or
//! host. The caller's own tenant always comes from the verified principal.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum_extra::TypedHeader;
use axum_extra::headers::Host;
use serde::Deserialize;

use stratix_core::error::AppError;

use crate::dto::response::{ApiResponse, BrandingResponse};
use crate::error::ApiResult;
use crate::extractors::AuthPrincipal;
use crate::state::AppState;

/// Query parameters for the branding endpoint.
#[derive(Debug, Deserialize)]
pub struct BrandingQuery {
    pub tenant: Option<String>,
}

/// GET /api/tenant/branding
pub async fn branding(
    State(state): State<AppState>,
    Query(query): Query<BrandingQuery>,
    host: Option<TypedHeader<Host>>,
) -> Json<ApiResponse<BrandingResponse>> {
    let requested = query
        .tenant
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let tenant = match requested {
        Some(id) => state.tenants.resolve(Some(id)),
        None => state
            .tenants
            .resolve_by_domain(host.as_ref().map(|TypedHeader(h)| h.hostname())),
    };

    Json(ApiResponse::ok(BrandingResponse::from(tenant)))
}

/// GET /api/tenant
pub async fn current(
    State(state): State<AppState>,
    auth: AuthPrincipal,
) -> Json<ApiResponse<BrandingResponse>> {
    let tenant = state.tenants.resolve(auth.tenant_id());
    Json(ApiResponse::ok(BrandingResponse::from(tenant)))
}

/// GET /api/tenant/theme.css
pub async fn theme_css(
    State(state): State<AppState>,
    auth: AuthPrincipal,
) -> ApiResult<impl IntoResponse> {
    let tenant = state.tenants.resolve(auth.tenant_id());
    let css = state
        .presentation
        .stylesheet_for(tenant)
        .ok_or_else(|| AppError::internal(format!("No presentation context for tenant '{}'", tenant.id)))?;

    Ok((
        [
            (CONTENT_TYPE, "text/css; charset=utf-8"),
            (CACHE_CONTROL, "private, no-store"),
        ],
        css,
    ))
}
