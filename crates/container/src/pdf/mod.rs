//! PDF containers (`.pdf`): one raster image per page.
//!
//! PDF is not an archive, so "unpacking" means pulling the embedded page
//! images out as individual files and "packing" means laying a directory of
//! images out as pages. Images are named so that a later pack restores the
//! original page order: `image_{page:04}_{index:03}.{ext}`.

mod build;
mod extract;

use crate::construct::PDF_MAGIC;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub(crate) use self::build::pack;
pub(crate) use self::extract::unpack;

/// Readers accept a header anywhere in the first kilobyte.
const HEADER_WINDOW: u64 = 1024;

pub(crate) fn test(archive: &Path) -> bool {
    let mut head = Vec::new();
    if File::open(archive).and_then(|file| file.take(HEADER_WINDOW).read_to_end(&mut head)).is_err() {
        return false;
    }
    head.windows(PDF_MAGIC.len()).any(|window| window == PDF_MAGIC.as_slice())
}
