//! Metadata Error Types
//!
//! Reading `ComicInfo.xml` never fails (a broken document is replaced by an
//! empty one), so the only errors that reach callers come from writing it back
//! or from naming a field that does not exist.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A metadata error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The sidecar file could not be written. Check permissions on the
    /// directory it lives in.
    #[display("could not write {}", _0.display())]
    PersistenceFailed(#[error(not(source))] PathBuf),
    /// The document is not well-formed XML.
    #[display("malformed metadata document")]
    Malformed,
    /// No metadata field has this name.
    #[display("unknown metadata field: {_0}")]
    UnknownField(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::PersistenceFailed(_))
    }
}
