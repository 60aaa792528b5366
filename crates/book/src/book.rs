use crate::backup;
use crate::error::{ErrorKind, Result};
use crate::snapshot::Snapshot;
use comix_container::{Format, Tools};
use comix_metadata::ComicInfo;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::instrument;

mod sealed {
    pub trait Sealed {}
}
/// Where a [`Book`] is in its open/edit/close lifecycle.
pub trait State: sealed::Sealed {}

/// A book that has not been unpacked. Constructing one does no I/O.
#[derive(Debug)]
pub struct Closed;
impl sealed::Sealed for Closed {}
impl State for Closed {}

/// An unpacked book with its scratch workspace.
#[derive(Debug)]
pub struct Open {
    workspace: TempDir,
    metadata: ComicInfo,
    baseline: Snapshot,
    input: Format,
    output: Format,
}
impl sealed::Sealed for Open {}
impl State for Open {}

/// What [`Book::close`] did with the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed since the book was opened; the archive was not touched.
    Unchanged,
    /// The archive no longer matches its declared format, so nothing was
    /// written.
    Invalid,
    /// A new archive was written and the previous one kept as a backup.
    Repacked { archive: PathBuf, backup: PathBuf },
}

/// A comic book archive on disk.
///
/// ```no_run
/// # fn main() -> comix_book::error::Result<()> {
/// use comix_book::{Book, Field};
///
/// let mut book = Book::new("Asterix 01.cbz").open()?;
/// book.metadata_mut().set(Field::Title, "Asterix the Gaul").ok();
/// book.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Book<S: State = Closed> {
    path: PathBuf,
    tools: Tools,
    state: S,
}

impl<S: State> Book<S> {
    /// Location of the archive this book was created from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tools(&self) -> &Tools {
        &self.tools
    }
}

impl Book {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), tools: Tools::default(), state: Closed }
    }

    /// Use explicitly located archivers instead of searching `PATH`.
    pub fn with_tools(mut self, tools: Tools) -> Self {
        self.tools = tools;
        self
    }

    /// Unpack the archive into a fresh workspace.
    ///
    /// # Errors
    /// - [`ErrorKind::UnknownFormat`] if the extension is not recognized.
    /// - [`ErrorKind::InvalidContainer`] if the content does not match the
    ///   extension, naming the format the content looks like. No workspace is
    ///   created.
    /// - [`ErrorKind::ExtractionFailed`] if unpacking fails. The workspace is
    ///   removed.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn open(self) -> Result<Book<Open>> {
        let input = Format::from_path(&self.path).or_raise(|| ErrorKind::UnknownFormat(extension_of(&self.path)))?;
        if !input.test(&self.path) {
            let detected = Format::sniff(&self.path);
            exn::bail!(ErrorKind::InvalidContainer { path: self.path, detected });
        }
        let workspace = tempfile::Builder::new().prefix("comix-").tempdir().or_raise(|| ErrorKind::Workspace)?;
        input
            .unpack_with(&self.tools, &self.path, workspace.path())
            .or_raise(|| ErrorKind::ExtractionFailed(self.path.clone()))?;
        let baseline = Snapshot::capture(workspace.path())?;
        let metadata = ComicInfo::open(workspace.path());
        tracing::info!(format = %input, files = baseline.len(), workspace = %workspace.path().display(), "Opened book");
        Ok(Book {
            path: self.path,
            tools: self.tools,
            state: Open { workspace, metadata, baseline, input, output: input },
        })
    }
}

impl Book<Open> {
    /// The directory holding the unpacked content. Files may be added,
    /// changed or removed freely until the book is closed.
    pub fn workspace(&self) -> &Path {
        self.state.workspace.path()
    }

    pub fn metadata(&self) -> &ComicInfo {
        &self.state.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut ComicInfo {
        &mut self.state.metadata
    }

    /// The format the archive was opened as.
    pub fn input_format(&self) -> Format {
        self.state.input
    }

    /// The format [`Book::close`] will write; the input format unless changed.
    pub fn output_format(&self) -> Format {
        self.state.output
    }

    /// Change the format written on close. This alone counts as a change.
    pub fn set_output_format(&mut self, format: Format) {
        self.state.output = format;
    }

    /// Change the format written on close, by name (`cbz`, `cbr`, `pdf`).
    pub fn set_output_format_str(&mut self, format: &str) -> Result<()> {
        let format = format.parse::<Format>().or_raise(|| ErrorKind::UnknownFormat(format.to_string()))?;
        self.set_output_format(format);
        Ok(())
    }

    /// Whether closing now would write a new archive.
    pub fn is_changed(&self) -> Result<bool> {
        if self.state.output != self.state.input {
            return Ok(true);
        }
        Ok(Snapshot::capture(self.workspace())? != self.state.baseline)
    }

    /// Write a new archive if anything changed, then delete the workspace.
    ///
    /// The replacement is packed next to the original first. Only once it is
    /// complete is the original renamed to `<name>.<ext>.bak` and the
    /// replacement moved to `<name>.<output ext>`, so a packing failure leaves
    /// the original untouched. The workspace is deleted whatever happens.
    ///
    /// When converting, a different file already named `<name>.<output ext>`
    /// is overwritten and not backed up.
    ///
    /// # Errors
    /// - [`ErrorKind::PackingFailed`] if the new archive cannot be written.
    /// - [`ErrorKind::Backup`] if the files cannot be moved into place.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn close(self) -> Result<Outcome> {
        let Book { path, tools, state } = self;
        let Open { workspace, input, output, baseline, .. } = state;
        let outcome = if !input.test(&path) {
            tracing::warn!(format = %input, "Archive no longer matches its format, not repacking");
            Outcome::Invalid
        } else if output == input && Snapshot::capture(workspace.path())? == baseline {
            Outcome::Unchanged
        } else {
            let target = output.apply_to(&path);
            let staging = staging_dir(&path)?;
            let staged = staging.path().join(target.file_name().unwrap_or(target.as_os_str()));
            output
                .pack_with(&tools, &staged, workspace.path())
                .or_raise(|| ErrorKind::PackingFailed(target.clone()))?;
            let backup = backup::replace(&path, &staged, &target)?;
            Outcome::Repacked { archive: target, backup }
        };
        let workspace_path = workspace.path().to_path_buf();
        if let Err(e) = workspace.close() {
            tracing::warn!(workspace = %workspace_path.display(), error = %e, "Could not remove workspace");
        }
        tracing::info!(outcome = ?outcome, "Closed book");
        Ok(outcome)
    }
}

/// A scratch directory beside `archive`, so the finished replacement can be
/// renamed into place without crossing filesystems.
fn staging_dir(archive: &Path) -> Result<TempDir> {
    let parent = match archive.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    tempfile::Builder::new().prefix(".comix-").tempdir_in(parent).or_raise(|| ErrorKind::Workspace)
}

fn extension_of(path: &Path) -> String {
    match path.extension() {
        Some(extension) => extension.to_string_lossy().into_owned(),
        None => path.display().to_string(),
    }
}
