use crate::error::{ErrorKind, Result};
use comix_container::{Format, walk};
use exn::ResultExt;
use std::path::{Path, PathBuf};

/// Every file under `directory` whose extension names a comic book format,
/// recursively and in sorted order. Content is not inspected.
pub fn find_books(directory: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let files = walk::files(directory).or_raise(|| ErrorKind::Workspace)?;
    let books: Vec<_> = files
        .into_iter()
        .filter(|file| Format::from_path(&file.relative).is_ok())
        .map(|file| file.absolute)
        .collect();
    tracing::debug!(books = books.len(), "Scanned for comic books");
    Ok(books)
}
