//! # stratix-api
//!
//! HTTP layer for the Stratix gateway built on Axum.
//!
//! Every request passes the request gate middleware, which classifies the
//! path, verifies the session of protected requests and stamps security
//! headers on whatever response is produced. Pages are forwarded to the
//! rendering frontend; `/api` routes are answered here.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod frontend;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
