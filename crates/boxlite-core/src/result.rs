//! Convenience result type alias for Boxlite.

use crate::error::AppError;

/// A specialized `Result` type for Boxlite operations.
pub type AppResult<T> = Result<T, AppError>;
