//! Replacing an archive while keeping the previous version as `.bak`.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The backup location of `archive`: the full file name with `.bak` appended,
/// so `book.cbz` is kept as `book.cbz.bak`.
pub fn backup_path(archive: impl AsRef<Path>) -> PathBuf {
    let mut name = OsString::from(archive.as_ref().as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Move `original` to its backup name, replacing an older backup, then move
/// `replacement` to `target`. Returns the backup path.
///
/// All paths must be on the same filesystem. If the replacement cannot be
/// moved into place the original is moved back. When `target` differs from
/// `original`, a file already at `target` is overwritten without a backup.
pub(crate) fn replace(original: &Path, replacement: &Path, target: &Path) -> Result<PathBuf> {
    let backup = backup_path(original);
    if target != original && target.exists() {
        tracing::warn!(path = %target.display(), "Overwriting existing file without a backup");
    }
    match fs::remove_file(&backup) {
        Ok(()) => tracing::debug!(backup = %backup.display(), "Removed previous backup"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {},
        Err(e) => return Err(e).or_raise(|| ErrorKind::Backup(original.to_path_buf())),
    }
    fs::rename(original, &backup).or_raise(|| ErrorKind::Backup(original.to_path_buf()))?;
    tracing::debug!(original = %original.display(), backup = %backup.display(), "Moved original to backup");
    if let Err(e) = fs::rename(replacement, target) {
        if let Err(restore) = fs::rename(&backup, original) {
            tracing::error!(backup = %backup.display(), error = %restore, "Could not restore original from backup");
        }
        return Err(e).or_raise(|| ErrorKind::Backup(original.to_path_buf()));
    }
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("book.cbz", "book.cbz.bak")]
    #[case("/comics/Asterix 01.cbr", "/comics/Asterix 01.cbr.bak")]
    #[case("no-extension", "no-extension.bak")]
    fn test_backup_path(#[case] archive: &str, #[case] expected: &str) {
        assert_eq!(backup_path(archive), PathBuf::from(expected));
    }

    #[test]
    fn replace_keeps_previous_version() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("book.cbz");
        let staged = dir.path().join("staged.pdf");
        let target = dir.path().join("book.pdf");
        fs::write(&original, b"original").unwrap();
        fs::write(&staged, b"replacement").unwrap();
        fs::write(dir.path().join("book.cbz.bak"), b"stale backup").unwrap();

        let backup = replace(&original, &staged, &target).unwrap();
        assert_eq!(backup, dir.path().join("book.cbz.bak"));
        assert_eq!(fs::read(&backup).unwrap(), b"original");
        assert_eq!(fs::read(&target).unwrap(), b"replacement");
        assert!(!original.exists());
        assert!(!staged.exists());
    }

    #[test]
    fn converting_overwrites_a_file_at_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("book.cbz");
        let staged = dir.path().join("staged.pdf");
        let target = dir.path().join("book.pdf");
        fs::write(&original, b"original").unwrap();
        fs::write(&staged, b"replacement").unwrap();
        fs::write(&target, b"unrelated").unwrap();

        replace(&original, &staged, &target).unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"replacement");
        assert!(!dir.path().join("book.pdf.bak").exists());
    }

    #[test]
    fn failed_move_restores_original() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("book.cbz");
        fs::write(&original, b"original").unwrap();
        let err = replace(&original, &dir.path().join("missing.cbz"), &original).unwrap_err();
        assert_eq!(*err, ErrorKind::Backup(original.clone()));
        assert_eq!(fs::read(&original).unwrap(), b"original");
    }
}
