//! Deterministic directory traversal.
//!
//! Packing and change detection both need the same view of an unpacked tree:
//! every regular file, recursively, in sorted order, relative to the root.
//! Symlinks are not followed and are not reported.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A regular file found under a root directory.
#[derive(Debug, Clone)]
pub struct WalkedFile {
    /// Path relative to the walked root
    pub relative: PathBuf,
    /// Path including the walked root
    pub absolute: PathBuf,
    pub metadata: Metadata,
}

/// Every regular file under `root`, sorted by path components.
pub fn files(root: impl AsRef<Path>) -> Result<Vec<WalkedFile>> {
    let root = root.as_ref();
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).follow_links(false).sort_by_file_name() {
        let entry = entry.or_raise(|| ErrorKind::Io)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let metadata = entry.metadata().or_raise(|| ErrorKind::Io)?;
        let relative = entry.path().strip_prefix(root).or_raise(|| ErrorKind::Io)?.to_path_buf();
        files.push(WalkedFile { relative, absolute: entry.into_path(), metadata });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walk_is_sorted_and_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b/nested")).unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("c.png"), b"c").unwrap();
        fs::write(dir.path().join("b/nested/2.png"), b"2").unwrap();
        fs::write(dir.path().join("b/1.png"), b"1").unwrap();
        fs::write(dir.path().join("a/0.png"), b"0").unwrap();
        let found: Vec<_> = files(dir.path()).unwrap().into_iter().map(|f| f.relative).collect();
        assert_eq!(
            found,
            vec![
                PathBuf::from("a/0.png"),
                PathBuf::from("b/1.png"),
                PathBuf::from("b/nested/2.png"),
                PathBuf::from("c.png"),
            ]
        );
    }

    #[test]
    fn walk_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("empty/deeper")).unwrap();
        assert!(files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn walk_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(files(dir.path().join("missing")).is_err());
    }
}
