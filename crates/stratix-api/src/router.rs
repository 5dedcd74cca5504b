//! Route definitions for the Stratix gateway.
//!
//! API routes are mounted under `/api`; every other path falls through to
//! page forwarding. The request gate wraps both, so classification and
//! verification happen before any handler runs.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_bytes;
    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(tenant_routes())
        .merge(data_routes())
        .merge(assistant_routes())
        .fallback(handlers::pages::api_not_found);

    Router::new()
        .nest("/api", api_routes)
        .fallback(handlers::pages::forward)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::gate::request_gate,
        ))
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::security::security_headers,
        ))
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Branding (public), the caller's tenant and its stylesheet.
fn tenant_routes() -> Router<AppState> {
    Router::new()
        .route("/tenant", get(handlers::tenant::current))
        .route("/tenant/branding", get(handlers::tenant::branding))
        .route("/tenant/theme.css", get(handlers::tenant::theme_css))
        .route("/me", get(handlers::me::me))
}

/// Dashboard data proxied to the backend.
fn data_routes() -> Router<AppState> {
    Router::new()
        .route("/objectives", get(handlers::data::objectives))
        .route("/initiatives", get(handlers::data::initiatives))
        .route("/areas", get(handlers::data::areas))
        .route("/statistics", get(handlers::data::statistics))
        .route(
            "/organization/settings",
            get(handlers::data::organization_settings)
                .patch(handlers::data::update_organization_settings),
        )
}

fn assistant_routes() -> Router<AppState> {
    Router::new().route("/assistant/webhook", post(handlers::assistant::webhook))
}
