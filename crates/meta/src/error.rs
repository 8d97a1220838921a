//! Metadata and Compilation Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A metadata/compile error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for metadata and compile operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Both variants are user-facing: the message is meant to be shown verbatim
/// next to the offending source.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The `==UserStyle==` metadata block is missing or malformed.
    #[display("invalid usercss metadata: {_0}")]
    MetadataParse(#[error(not(source))] String),
    /// Metadata is valid but the style body could not be compiled.
    #[display("failed to compile style: {_0}")]
    Compile(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The source is either valid or it isn't.
        false
    }
}
