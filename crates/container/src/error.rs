//! Container Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. The public operations raise one of
//! the top-level kinds ([`ErrorKind::ExtractionFailed`],
//! [`ErrorKind::PackingFailed`], [`ErrorKind::UnknownFormat`]) with the
//! underlying cause attached as a child frame.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A container error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The extension or name is not one of the recognized container formats.
    #[display("unknown comic book format: {_0}")]
    UnknownFormat(#[error(not(source))] String),
    /// The archive could not be extracted. Check the child frame for the cause.
    #[display("could not extract {}", _0.display())]
    ExtractionFailed(#[error(not(source))] PathBuf),
    /// The archive could not be created. Check the child frame for the cause.
    #[display("could not create {}", _0.display())]
    PackingFailed(#[error(not(source))] PathBuf),
    /// A required external program is not installed (or not on `PATH`).
    #[display("program not found: {_0}")]
    ToolNotFound(#[error(not(source))] String),
    /// An external program ran but reported failure.
    #[display("external program failed: {_0}")]
    ToolFailed(#[error(not(source))] String),
    /// An image uses an encoding that cannot be carried across formats.
    #[display("unsupported image: {_0}")]
    UnsupportedImage(#[error(not(source))] String),
    /// An image embedded in a PDF page could not be turned into a file.
    #[display("could not extract image {name} of page {page}")]
    PageImage { page: u32, name: String },
    /// The PDF object model could not be read or written.
    #[display("invalid PDF document")]
    Pdf,
    /// Image data could not be decoded or encoded.
    #[display("invalid image data")]
    Image,
    /// Data is corrupt or malformed. Don't retry with the same input.
    #[display("invalid or corrupted archive")]
    InvalidData,
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io | ErrorKind::ToolNotFound(_))
    }
}
