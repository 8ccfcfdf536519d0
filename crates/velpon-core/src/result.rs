//! Convenience result type alias for Velpon.

use crate::error::AppError;

/// A specialized `Result` type for Velpon operations.
pub type AppResult<T> = Result<T, AppError>;
