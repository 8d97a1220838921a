//! Prefetch Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A prefetch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for prefetch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Downloading the source text failed.
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// Reading or writing the key-value store failed.
    #[display("key-value store error")]
    Storage,
    /// The install request lacks what's needed to open the page.
    #[display("invalid install request: {_0}")]
    InvalidRequest(#[error(not(source))] &'static str),
    /// The tab/URL opener refused to open the install page.
    #[display("failed to open install page")]
    Opener,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Storage)
    }
}
