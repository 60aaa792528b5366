//! Book Error Types
//!
//! Errors raised while opening or closing a [`Book`](crate::Book). Container
//! and filesystem failures are attached as child frames of one of these kinds.

use comix_container::Format;
use derive_more::{Display, Error};
use std::path::PathBuf;

/// A book error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for book operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The name does not carry one of the recognized extensions.
    #[display("unknown comic book format: {_0}")]
    UnknownFormat(#[error(not(source))] String),
    /// The file's content does not match the format its extension declares.
    /// `detected` is the format the content looks like, if any.
    #[display(
        "{} is not a valid container for its extension{}",
        path.display(),
        detected.map(|format| format!(" (content looks like {format})")).unwrap_or_default()
    )]
    InvalidContainer { path: PathBuf, detected: Option<Format> },
    #[display("could not extract {}", _0.display())]
    ExtractionFailed(#[error(not(source))] PathBuf),
    #[display("could not create {}", _0.display())]
    PackingFailed(#[error(not(source))] PathBuf),
    /// The scratch directory could not be created or inspected.
    #[display("workspace error")]
    Workspace,
    /// The original could not be moved aside, or the replacement moved into
    /// place.
    #[display("could not back up {}", _0.display())]
    Backup(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Workspace | ErrorKind::Backup(_))
    }
}
