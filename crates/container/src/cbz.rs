//! ZIP containers (`.cbz`), handled in-process.

use crate::error::{ErrorKind, Result};
use crate::walk;
use exn::ResultExt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

pub(crate) fn unpack(archive: &Path, destination: &Path) -> Result<()> {
    let file = File::open(archive).or_raise(|| ErrorKind::Io)?;
    let mut zip = ZipArchive::new(BufReader::new(file)).or_raise(|| ErrorKind::InvalidData)?;
    // Entries whose names would escape the destination are rejected by the
    // zip crate itself (enclosed names only).
    zip.extract(destination).or_raise(|| ErrorKind::InvalidData)?;
    tracing::debug!(entries = zip.len(), "Extracted ZIP archive");
    Ok(())
}

pub(crate) fn pack(archive: &Path, source: &Path) -> Result<()> {
    // Fixed timestamps keep the output a function of the input tree alone.
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);
    let file = File::create(archive).or_raise(|| ErrorKind::Io)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let files = walk::files(source)?;
    for entry in &files {
        let name = entry_name(&entry.relative)?;
        zip.start_file(name, options).or_raise(|| ErrorKind::Io)?;
        let mut input = File::open(&entry.absolute).or_raise(|| ErrorKind::Io)?;
        io::copy(&mut input, &mut zip).or_raise(|| ErrorKind::Io)?;
    }
    let writer = zip.finish().or_raise(|| ErrorKind::Io)?;
    writer.into_inner().map_err(|e| e.into_error()).or_raise(|| ErrorKind::Io)?.sync_all().or_raise(|| ErrorKind::Io)?;
    tracing::debug!(entries = files.len(), "Created ZIP archive");
    Ok(())
}

pub(crate) fn test(archive: &Path) -> bool {
    File::open(archive).is_ok_and(|file| ZipArchive::new(BufReader::new(file)).is_ok())
}

/// ZIP entry names always use forward slashes, whatever the platform.
fn entry_name(relative: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        match component.as_os_str().to_str() {
            Some(part) => parts.push(part),
            None => exn::bail!(ErrorKind::InvalidData),
        }
    }
    Ok(parts.join("/"))
}
