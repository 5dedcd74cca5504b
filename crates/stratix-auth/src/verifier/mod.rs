//! Session verification against the identity provider.
//!
//! A verifier never trusts locally decoded claims: `RemoteSessionVerifier`
//! asks the provider, `JwtSessionVerifier` checks the signature.

pub mod jwt;
pub mod remote;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use stratix_core::config::{IdentityConfig, VerificationMode};

use crate::credentials::{PendingCookies, SessionCredentials};
use crate::error::AuthError;
use crate::principal::Principal;

pub use jwt::JwtSessionVerifier;
pub use remote::RemoteSessionVerifier;

/// Verifies request credentials and yields the caller's identity.
#[async_trait]
pub trait SessionVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Verifies `credentials`.
    ///
    /// Cookie changes made along the way (refreshed or cleared sessions)
    /// are recorded in `pending`, whatever the outcome.
    async fn verify(
        &self,
        credentials: &SessionCredentials,
        pending: &mut PendingCookies,
    ) -> Result<Principal, AuthError>;
}

/// Builds the verifier selected by configuration.
pub fn build_verifier(
    config: &IdentityConfig,
    request_timeout: Duration,
) -> Result<Arc<dyn SessionVerifier>, AuthError> {
    match config.verification {
        VerificationMode::Remote => Ok(Arc::new(RemoteSessionVerifier::new(
            config,
            request_timeout,
        )?)),
        VerificationMode::Jwt => Ok(Arc::new(JwtSessionVerifier::new(config)?)),
    }
}
