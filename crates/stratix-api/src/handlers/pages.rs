//! Page requests: everything outside `/api`.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::response::Response;

use stratix_auth::Principal;
use stratix_backend::client::TENANT_HEADER;
use stratix_core::error::AppError;

use crate::error::{ApiError, ApiResult};
use crate::frontend::header_pair;
use crate::state::AppState;

/// Fallback for non-API paths. Forwards to the rendering frontend with the
/// resolved tenant of a verified caller.
pub async fn forward(State(state): State<AppState>, request: Request) -> ApiResult<Response> {
    let Some(frontend) = state.frontend.as_ref() else {
        return Err(AppError::not_found("No page is served at this path").into());
    };

    let mut extra = HeaderMap::new();
    if let Some(principal) = request.extensions().get::<Principal>() {
        let tenant = state.tenants.resolve(principal.tenant_id.as_deref());
        if let Some((name, value)) = header_pair(TENANT_HEADER, &tenant.id) {
            extra.insert(name, value);
        }
    }

    Ok(frontend.forward(request, extra).await?)
}

/// Fallback inside `/api`.
pub async fn api_not_found() -> ApiError {
    ApiError(AppError::not_found("Unknown API route"))
}
