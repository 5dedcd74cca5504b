//! # stratix-auth
//!
//! Session-authenticated request gating for the Stratix gateway.
//!
//! ## Modules
//!
//! - `routes`: ordered prefix table classifying paths as public/protected
//! - `credentials`: session credentials parsed from cookies or headers, and
//!   the cookie mutations produced while verifying them
//! - `verifier`: identity-provider and JWT session verification
//! - `principal`: the verified identity handed to downstream consumers
//! - `gate`: the per-request gate decision

pub mod credentials;
pub mod error;
pub mod gate;
pub mod principal;
pub mod routes;
pub mod verifier;

pub use credentials::{PendingCookies, SessionCredentials};
pub use error::AuthError;
pub use gate::{GateDecision, RequestGate, login_redirect};
pub use principal::Principal;
pub use routes::{RouteClass, RouteTable, is_canonical_path};
pub use verifier::{JwtSessionVerifier, RemoteSessionVerifier, SessionVerifier};
