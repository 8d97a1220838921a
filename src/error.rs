//! Pipeline Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Errors from the compiler and the
//! style store are re-raised into the matching category here, keeping the
//! original frame as a child of the error tree.

use derive_more::{Display, Error};
use ucss_meta::error::{Error as MetaError, ErrorKind as MetaErrorKind};
use ucss_model::StyleId;
use ucss_storage::error::{Error as StorageError, ErrorKind as StorageErrorKind};

/// A pipeline error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a pipeline failure.
///
/// ### Dependency Errors
/// - [`ErrorKind::MetadataParse`] and [`ErrorKind::Compile`] come from the
///   [`Compiler`](ucss_meta::Compiler).
/// - [`ErrorKind::NotFound`] and [`ErrorKind::Storage`] come from the
///   [`StyleStore`](ucss_storage::StyleStore).
///
/// ### Operational Errors
/// - [`ErrorKind::InvalidStyle`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The usercss metadata block is missing or malformed.
    #[display("invalid usercss metadata")]
    MetadataParse,
    /// The style body could not be compiled.
    #[display("failed to compile style")]
    Compile,
    /// No installed style has the requested id.
    #[display("style not found: {_0}")]
    NotFound(#[error(not(source))] StyleId),
    /// The style store failed for any other reason.
    #[display("style storage error")]
    Storage,
    /// The style lacks what the operation needs.
    #[display("invalid style: {_0}")]
    InvalidStyle(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Convert a compiler error, preserving its frame as a child.
    #[track_caller]
    pub fn meta(err: MetaError) -> Error {
        let kind = match &*err {
            MetaErrorKind::MetadataParse(_) => Self::MetadataParse,
            MetaErrorKind::Compile(_) => Self::Compile,
        };
        err.raise(kind)
    }

    /// Convert a style store error, preserving its frame as a child.
    #[track_caller]
    pub fn storage(err: StorageError) -> Error {
        let kind = match &*err {
            StorageErrorKind::NotFound(id) => Self::NotFound(*id),
            _ => Self::Storage,
        };
        err.raise(kind)
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::parse(MetaErrorKind::MetadataParse("missing mandatory @name".into()), ErrorKind::MetadataParse)]
    #[case::compile(MetaErrorKind::Compile("1 unclosed block(s)".into()), ErrorKind::Compile)]
    fn test_meta_errors_keep_category(#[case] inner: MetaErrorKind, #[case] expected: ErrorKind) {
        let err = ErrorKind::meta(exn::Exn::from(inner));
        assert_eq!(*err, expected);
    }

    #[rstest]
    #[case::not_found(StorageErrorKind::NotFound(StyleId(4)), ErrorKind::NotFound(StyleId(4)))]
    #[case::serialization(StorageErrorKind::Serialization, ErrorKind::Storage)]
    #[case::backend(StorageErrorKind::Backend("quota".into()), ErrorKind::Storage)]
    fn test_storage_errors_keep_category(#[case] inner: StorageErrorKind, #[case] expected: ErrorKind) {
        let err = ErrorKind::storage(exn::Exn::from(inner));
        assert_eq!(*err, expected);
    }

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::NotFound(StyleId(3)).to_string(), "style not found: 3");
        assert_eq!(ErrorKind::InvalidStyle("no source").to_string(), "invalid style: no source");
    }
}
