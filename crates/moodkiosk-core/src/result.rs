//! Convenience result type alias for MoodKiosk.

use crate::error::AppError;

/// A specialized `Result` type for MoodKiosk operations.
pub type AppResult<T> = Result<T, AppError>;
