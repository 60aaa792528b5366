use crate::error::{ErrorKind, Result};
use comix_container::walk;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Every regular file under a directory with its modification time, in
/// sorted path order.
///
/// Two snapshots are equal only if they list the same paths, in the same
/// order, with the same timestamps. Content is never read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<(PathBuf, SystemTime)>,
}

impl Snapshot {
    pub fn capture(root: impl AsRef<Path>) -> Result<Self> {
        let mut entries = Vec::new();
        for file in walk::files(root).or_raise(|| ErrorKind::Workspace)? {
            let modified = file.metadata.modified().or_raise(|| ErrorKind::Workspace)?;
            entries.push((file.relative, modified));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths relative to the captured root.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|(path, _)| path.as_path())
    }
}
