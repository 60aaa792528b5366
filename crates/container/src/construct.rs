use crate::Format;
use crate::error::{Error, ErrorKind, Result};
use std::fs::File;
use std::io::Read;
use std::{path::Path, str::FromStr};

pub(crate) const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
pub(crate) const ZIP_EMPTY_MAGIC: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];
pub(crate) const RAR_MAGIC: [u8; 6] = [0x52, 0x61, 0x72, 0x21, 0x1A, 0x07];
pub(crate) const PDF_MAGIC: [u8; 5] = *b"%PDF-";

impl FromStr for Format {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "cbz" | "zip" => Ok(Format::Cbz),
            "cbr" | "rar" => Ok(Format::Cbr),
            "pdf" => Ok(Format::Pdf),
            _ => exn::bail!(ErrorKind::UnknownFormat(s.to_string())),
        }
    }
}
impl Format {
    /// Detect the declared format from a file extension.
    ///
    /// This is pure: the file is never touched. Only the comic book extensions
    /// (`.cbz`, `.cbr`, `.pdf`, any case) are recognized; `.zip` and `.rar`
    /// files are not comic books as far as paths are concerned.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()).map(str::to_lowercase).as_deref() {
            Some("cbz") => Ok(Format::Cbz),
            Some("cbr") => Ok(Format::Cbr),
            Some("pdf") => Ok(Format::Pdf),
            _ => exn::bail!(ErrorKind::UnknownFormat(path.display().to_string())),
        }
    }

    /// Detect the actual format from the first bytes of a file.
    ///
    /// Returns `None` if no signature matches or if the input is too short to
    /// detect any format. PDF headers are only recognized at the very start
    /// here; [`Format::test`] is more lenient.
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&ZIP_MAGIC) || bytes.starts_with(&ZIP_EMPTY_MAGIC) {
            return Some(Format::Cbz);
        }
        if bytes.starts_with(&RAR_MAGIC) {
            return Some(Format::Cbr);
        }
        if bytes.starts_with(&PDF_MAGIC) {
            return Some(Format::Pdf);
        }
        None
    }

    /// Detect the actual format of a file from its first bytes. A file that
    /// cannot be read is not any format.
    pub fn sniff(path: impl AsRef<Path>) -> Option<Self> {
        let mut header = Vec::with_capacity(RAR_MAGIC.len());
        File::open(path).ok()?.take(RAR_MAGIC.len() as u64).read_to_end(&mut header).ok()?;
        Self::from_magic_bytes(&header)
    }
}

#[cfg(test)]
mod tests {
    use crate::Format;
    use crate::error::ErrorKind;
    use rstest::rstest;

    #[rstest]
    #[case("cbz", Format::Cbz)]
    #[case("CBZ", Format::Cbz)]
    #[case(".cbz", Format::Cbz)]
    #[case("zip", Format::Cbz)]
    #[case("cbr", Format::Cbr)]
    #[case("rar", Format::Cbr)]
    #[case("pdf", Format::Pdf)]
    #[case(" Pdf ", Format::Pdf)]
    fn test_from_str(#[case] test: &str, #[case] expected: Format) {
        assert_eq!(test.parse::<Format>().unwrap(), expected);
    }

    #[rstest]
    #[case("epub")]
    #[case("cb7")]
    #[case("")]
    #[case("definitely not valid")]
    fn test_from_str_invalid(#[case] test: &str) {
        let err = test.parse::<Format>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnknownFormat(_)));
    }

    #[rstest]
    #[case("book.cbz", Format::Cbz)]
    #[case("book.CBZ", Format::Cbz)]
    #[case("dir/Some.Comic.01.cbr", Format::Cbr)]
    #[case("/abs/path/book.pdf", Format::Pdf)]
    #[case("book.tar.pdf", Format::Pdf)]
    fn test_from_path(#[case] test: &str, #[case] expected: Format) {
        assert_eq!(Format::from_path(test).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("book")]
    #[case("book.zip")]
    #[case("book.cbz.bak")]
    #[case("book.epub")]
    // A dotfile has no extension.
    #[case(".cbz")]
    fn test_from_path_unknown(#[case] test: &str) {
        let err = Format::from_path(test).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnknownFormat(_)));
    }

    #[rstest]
    #[case(b"", None)]
    #[case(b"PK", None)]
    #[case(b"PK\x03\x04\x14\x00", Some(Format::Cbz))]
    #[case(b"PK\x05\x06\x00\x00", Some(Format::Cbz))]
    #[case(b"Rar!\x1a\x07\x00", Some(Format::Cbr))]
    #[case(b"Rar!\x1a\x07\x01\x00", Some(Format::Cbr))]
    #[case(b"Rar!\x1a\x06", None)]
    #[case(b"%PDF-1.7\n", Some(Format::Pdf))]
    #[case(b"<!DOCTYPE html>", None)]
    fn test_from_magic_bytes(#[case] bytes: &[u8], #[case] expected: Option<Format>) {
        assert_eq!(Format::from_magic_bytes(bytes), expected);
    }

    #[test]
    fn test_sniff() {
        let dir = tempfile::tempdir().unwrap();
        let zip = dir.path().join("book.cbr");
        std::fs::write(&zip, b"PK\x03\x04 and then some").unwrap();
        assert_eq!(Format::sniff(&zip), Some(Format::Cbz));
        let text = dir.path().join("book.pdf");
        std::fs::write(&text, b"hello").unwrap();
        assert_eq!(Format::sniff(&text), None);
        assert_eq!(Format::sniff(dir.path().join("missing.cbz")), None);
    }
}
