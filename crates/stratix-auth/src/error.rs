//! Session verification failures.

use std::time::Duration;

use thiserror::Error;

use stratix_core::error::{AppError, ErrorKind};

/// Why a session could not be verified.
///
/// The gate treats every variant as "unauthenticated"; the variant is only
/// used for logging.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The request carried no session material.
    #[error("no session credentials on request")]
    MissingCredentials,
    /// The provider rejected the credentials.
    #[error("invalid session credentials: {0}")]
    InvalidCredentials(String),
    /// The session token has expired and could not be refreshed.
    #[error("session expired")]
    Expired,
    /// The identity provider could not be reached or answered unexpectedly.
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Verification did not finish within the configured bound.
    #[error("session verification timed out after {0:?}")]
    Timeout(Duration),
    /// The provider answered with a body that could not be interpreted.
    #[error("malformed identity provider response: {0}")]
    MalformedResponse(String),
}

impl AuthError {
    /// Short stable label used as a structured log field.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing_credentials",
            Self::InvalidCredentials(_) => "invalid_credentials",
            Self::Expired => "expired",
            Self::ProviderUnavailable(_) => "provider_unavailable",
            Self::Timeout(_) => "timeout",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }

    /// Whether the provider gave a definitive "no" (as opposed to failing).
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::InvalidCredentials(_) | Self::Expired)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::with_source(ErrorKind::Authentication, err.to_string(), err)
    }
}
