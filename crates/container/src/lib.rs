//! Comic book containers with automatic format detection.
//!
//! This crate wraps the three comic book archive families behind a unified
//! [`Format`] enum, providing:
//!
//! - **Format detection** from file extensions ([`Format::from_path`]) or
//!   magic bytes ([`Format::from_magic_bytes`], [`Format::sniff`])
//! - **Unpacking** every entry of an archive into a directory
//!   ([`Format::unpack`])
//! - **Packing** a directory tree into a new archive ([`Format::pack`])
//! - **Testing** whether a file's content actually matches a format
//!   ([`Format::test`]), regardless of its extension
//!
//! CBZ and PDF are handled in-process. CBR has no pure Rust writer, so the
//! `rar`/`unrar` executables are discovered on the system and invoked
//! synchronously; see [`Tools`] to point at specific binaries.

mod cbr;
mod cbz;
mod construct;
pub mod error;
mod pdf;
mod tools;
mod util;
pub mod walk;

pub use crate::tools::Tools;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::Path;
use tracing::instrument;

/// A supported comic book container format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// ZIP archive (.cbz)
    Cbz,
    /// RAR archive (.cbr)
    Cbr,
    /// PDF document, one image per page (.pdf)
    Pdf,
}

impl Format {
    /// All known formats, in a stable order.
    pub const ALL: [Format; 3] = [Format::Cbz, Format::Cbr, Format::Pdf];

    /// Extract all entries of `archive` into `destination`, using executables
    /// discovered on `PATH` where one is needed.
    pub fn unpack(&self, archive: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<()> {
        self.unpack_with(&Tools::default(), archive, destination)
    }

    /// Extract all entries of `archive` into `destination`.
    ///
    /// For [`Format::Pdf`] the embedded page images are written as
    /// `image_{page:04}_{index:03}.{ext}`, both counters starting at one.
    ///
    /// # Errors
    /// Raises [`ErrorKind::ExtractionFailed`] wrapping the underlying cause
    /// (missing executable, non-zero exit, corrupt archive, I/O).
    #[instrument(skip_all, fields(format = %self, archive = %archive.as_ref().display()))]
    pub fn unpack_with(&self, tools: &Tools, archive: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<()> {
        let (archive, destination) = (archive.as_ref(), destination.as_ref());
        match self {
            Format::Cbz => cbz::unpack(archive, destination),
            Format::Cbr => cbr::unpack(tools, archive, destination),
            Format::Pdf => pdf::unpack(archive, destination),
        }
        .or_raise(|| ErrorKind::ExtractionFailed(archive.to_path_buf()))
    }

    /// Create a new archive at `archive` from every regular file under
    /// `source`, using executables discovered on `PATH` where one is needed.
    pub fn pack(&self, archive: impl AsRef<Path>, source: impl AsRef<Path>) -> Result<()> {
        self.pack_with(&Tools::default(), archive, source)
    }

    /// Create a new archive at `archive` from every regular file under
    /// `source`, walked in sorted order and stored relative to `source`.
    ///
    /// For [`Format::Pdf`] only raster images (`jpg`, `jpeg`, `png`, `gif`)
    /// are included, one page each, sized to the image.
    ///
    /// # Errors
    /// Raises [`ErrorKind::PackingFailed`] wrapping the underlying cause.
    #[instrument(skip_all, fields(format = %self, archive = %archive.as_ref().display()))]
    pub fn pack_with(&self, tools: &Tools, archive: impl AsRef<Path>, source: impl AsRef<Path>) -> Result<()> {
        let (archive, source) = (archive.as_ref(), source.as_ref());
        match self {
            Format::Cbz => cbz::pack(archive, source),
            Format::Cbr => cbr::pack(tools, archive, source),
            Format::Pdf => pdf::pack(archive, source),
        }
        .or_raise(|| ErrorKind::PackingFailed(archive.to_path_buf()))
    }

    /// Whether the content of `archive` matches this format. A file that
    /// cannot be read does not match anything.
    pub fn test(&self, archive: impl AsRef<Path>) -> bool {
        let archive = archive.as_ref();
        let matches = match self {
            Format::Cbz => cbz::test(archive),
            Format::Cbr => cbr::test(archive),
            Format::Pdf => pdf::test(archive),
        };
        tracing::debug!(format = %self, archive = %archive.display(), matches, "Tested container signature");
        matches
    }
}

#[cfg(test)]
mod tests {
    use crate::Format;

    #[test]
    fn missing_file_matches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.cbz");
        for format in Format::ALL {
            assert!(!format.test(&missing), "{format} matched a missing file");
        }
    }
}
