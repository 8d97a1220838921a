//! Storage Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use ucss_model::StyleId;

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No style is stored under the requested id.
    #[display("style not found: {_0}")]
    NotFound(#[error(not(source))] StyleId),
    /// A stored value could not be converted to or from JSON.
    #[display("invalid stored data")]
    Serialization,
    /// Backend-specific error (connection lost, quota exceeded, etc.)
    #[display("backend error: {_0}")]
    Backend(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}
