//! Convenience result type alias for Stratix.

use crate::error::AppError;

/// A specialized `Result` type for Stratix operations.
pub type AppResult<T> = Result<T, AppError>;
