//! Backend fetch errors.

use thiserror::Error;

use stratix_core::{AppError, ErrorKind};

/// A backend call that did not produce a usable 2xx response.
///
/// `status` is `None` when the request never got an HTTP answer
/// (connection refused, timeout, interrupted body).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DataFetchError {
    pub status: Option<u16>,
    pub message: String,
}

impl DataFetchError {
    /// Error carrying the upstream HTTP status.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Error for a request that got no HTTP answer.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::transport("backend request timed out")
        } else {
            Self::transport(format!("backend unreachable: {err}"))
        }
    }
}

impl From<DataFetchError> for AppError {
    fn from(err: DataFetchError) -> Self {
        let kind = match err.status {
            Some(401) => ErrorKind::Authentication,
            Some(403) => ErrorKind::Authorization,
            Some(404) => ErrorKind::NotFound,
            Some(400 | 422) => ErrorKind::Validation,
            Some(_) => ErrorKind::ExternalService,
            None => ErrorKind::ServiceUnavailable,
        };
        let app = AppError::new(kind, err.message);
        match err.status {
            Some(status) => app.with_upstream_status(status),
            None => app,
        }
    }
}
