//! Assistant errors.

use thiserror::Error;

use stratix_core::{AppError, ErrorKind};

/// Failures while answering an assistant request.
///
/// Except for [`AssistantError::EmptyRequest`], these are reported back to
/// the caller inside a normal assistant response rather than as HTTP errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistantError {
    /// The body was missing or not a JSON object.
    #[error("No se recibieron datos")]
    EmptyRequest,
    /// A webhook tag with no known action.
    #[error("Unsupported tag: {0}")]
    UnsupportedTag(String),
    /// Tool parameters that select no action.
    #[error("No valid action found for tool parameters: {0}")]
    NoAction(String),
    /// No edge function is configured.
    #[error("Assistant backend is not configured")]
    NotConfigured,
    /// The edge function could not be reached.
    #[error("Network error calling assistant backend: {0}")]
    Network(String),
    /// The edge function answered with a non-200 status.
    #[error("Assistant backend request failed: {status} - {body}")]
    Upstream { status: u16, body: String },
    /// The edge function answered `success: false`.
    #[error("{0}")]
    Rejected(String),
    /// Anything else.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AssistantError> for AppError {
    fn from(err: AssistantError) -> Self {
        let kind = match &err {
            AssistantError::EmptyRequest
            | AssistantError::UnsupportedTag(_)
            | AssistantError::NoAction(_) => ErrorKind::Validation,
            AssistantError::NotConfigured => ErrorKind::Configuration,
            AssistantError::Network(_) => ErrorKind::ServiceUnavailable,
            AssistantError::Upstream { .. } | AssistantError::Rejected(_) => {
                ErrorKind::ExternalService
            }
            AssistantError::Internal(_) => ErrorKind::Internal,
        };
        let status = match &err {
            AssistantError::Upstream { status, .. } => Some(*status),
            _ => None,
        };
        let app = AppError::new(kind, err.to_string());
        match status {
            Some(status) => app.with_upstream_status(status),
            None => app,
        }
    }
}
