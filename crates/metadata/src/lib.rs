//! `ComicInfo.xml` metadata for unpacked comic books.
//!
//! [`ComicInfo`] is a key/value view over the sidecar document at the root of
//! an unpacked book. Reading never fails: a missing document is synthesized
//! in memory and a malformed one is replaced by an empty document (with a
//! warning, see [`ComicInfo::recovered`]). Every [`ComicInfo::set`] rewrites
//! the whole file atomically, so there is no separate "save" step.
//!
//! Elements that are not one of the known [`Field`]s (such as `<Pages>`) are
//! kept as they are.

mod document;
pub mod error;
mod field;

pub use crate::field::Field;
use crate::document::Element;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const ROOT: &str = "ComicInfo";
const XMLNS_XSD: &str = "http://www.w3.org/2001/XMLSchema";
const XMLNS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// The metadata document of one unpacked book.
#[derive(Debug)]
pub struct ComicInfo {
    path: PathBuf,
    root: Element,
    recovered: bool,
}

impl ComicInfo {
    /// Name of the sidecar file, at the root of the unpacked tree.
    pub const FILE_NAME: &'static str = "ComicInfo.xml";

    /// Load the metadata document of the book unpacked in `directory`.
    ///
    /// Nothing is written until a field is [set](ComicInfo::set).
    pub fn open(directory: impl AsRef<Path>) -> Self {
        let path = directory.as_ref().join(Self::FILE_NAME);
        let (root, recovered) = match fs::read_to_string(&path) {
            Ok(xml) => match document::parse(&xml) {
                Ok(root) => (root, false),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed metadata document");
                    (empty_document(), true)
                },
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => (empty_document(), false),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable metadata document");
                (empty_document(), true)
            },
        };
        Self { path, root, recovered }
    }

    /// The value of `field`, or `None` if the element is absent or empty.
    pub fn get(&self, field: Field) -> Option<String> {
        let text = self.root.child(field.as_str())?.text();
        (!text.is_empty()).then_some(text)
    }

    /// Set `field` to `value` and rewrite the document.
    ///
    /// An existing element keeps its position; a new one is appended after
    /// the existing children.
    ///
    /// # Errors
    /// Raises [`ErrorKind::PersistenceFailed`] if the document cannot be
    /// written, in which case the file on disk is left as it was.
    pub fn set(&mut self, field: Field, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        match self.root.child_mut(field.as_str()) {
            Some(element) => element.set_text(value),
            None => {
                let mut element = Element::new(field.as_str());
                element.set_text(value);
                self.root.push(element);
            },
        }
        self.save()
    }

    /// The fields present in the document with a non-empty value, in
    /// document order.
    pub fn fields(&self) -> impl Iterator<Item = (Field, String)> + '_ {
        self.root.elements().filter_map(|element| {
            let field = Field::from_element(&element.name)?;
            let text = element.text();
            (!text.is_empty()).then_some((field, text))
        })
    }

    /// Location of the sidecar file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the sidecar file currently exists on disk.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Whether an existing document had to be discarded because it could not
    /// be read or parsed.
    pub fn recovered(&self) -> bool {
        self.recovered
    }

    fn save(&self) -> Result<()> {
        let failed = || ErrorKind::PersistenceFailed(self.path.clone());
        let bytes = document::serialize(&self.root).or_raise(failed)?;
        let directory = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut file = NamedTempFile::new_in(directory).or_raise(failed)?;
        file.write_all(&bytes).or_raise(failed)?;
        file.as_file().sync_all().or_raise(failed)?;
        file.persist(&self.path).or_raise(failed)?;
        tracing::debug!(path = %self.path.display(), "Wrote metadata document");
        Ok(())
    }
}

fn empty_document() -> Element {
    Element::new(ROOT).with_attribute("xmlns:xsd", XMLNS_XSD).with_attribute("xmlns:xsi", XMLNS_XSI)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_document_is_synthesized_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let info = ComicInfo::open(dir.path());
        assert!(!info.exists());
        assert!(!info.recovered());
        assert_eq!(info.get(Field::Title), None);
        assert_eq!(info.fields().count(), 0);
        assert!(!dir.path().join(ComicInfo::FILE_NAME).exists());
    }

    #[test]
    fn set_writes_through() {
        let dir = tempfile::tempdir().unwrap();
        let mut info = ComicInfo::open(dir.path());
        info.set(Field::Title, "Asterix").unwrap();
        assert!(info.exists());
        let xml = fs::read_to_string(dir.path().join("ComicInfo.xml")).unwrap();
        assert!(xml.contains("<Title>Asterix</Title>"), "{xml}");
        assert!(xml.contains(XMLNS_XSI));

        let reopened = ComicInfo::open(dir.path());
        assert_eq!(reopened.get(Field::Title).as_deref(), Some("Asterix"));
    }

    #[test]
    fn set_replaces_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let mut info = ComicInfo::open(dir.path());
        info.set(Field::Series, "Spirou").unwrap();
        info.set(Field::Number, "1").unwrap();
        info.set(Field::Series, "Spirou et Fantasio").unwrap();
        let fields: Vec<_> = ComicInfo::open(dir.path()).fields().collect();
        assert_eq!(
            fields,
            vec![(Field::Series, "Spirou et Fantasio".to_string()), (Field::Number, "1".to_string())]
        );
    }

    #[test]
    fn values_are_stored_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let mut info = ComicInfo::open(dir.path());
        info.set(Field::Summary, "  Line one\n").unwrap();
        info.set(Field::Notes, "   ").unwrap();
        let reopened = ComicInfo::open(dir.path());
        assert!(!reopened.recovered());
        assert_eq!(reopened.get(Field::Summary).as_deref(), Some("  Line one\n"));
        assert_eq!(reopened.get(Field::Notes).as_deref(), Some("   "));
    }

    #[test]
    fn unknown_elements_survive_rewrites() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("ComicInfo.xml"),
            r#"<?xml version="1.0"?>
<ComicInfo>
  <Title></Title>
  <Pages>
    <Page Image="0" Type="FrontCover" />
  </Pages>
</ComicInfo>"#,
        )
        .unwrap();
        let mut info = ComicInfo::open(dir.path());
        assert_eq!(info.get(Field::Title), None);
        info.set(Field::Writer, "Goscinny").unwrap();
        let xml = fs::read_to_string(dir.path().join("ComicInfo.xml")).unwrap();
        assert!(xml.contains(r#"<Page Image="0" Type="FrontCover"/>"#), "{xml}");
        assert!(xml.find("<Pages>").unwrap() < xml.find("<Writer>").unwrap());
    }

    #[test]
    fn malformed_document_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ComicInfo.xml"), "<ComicInfo><Title>Broken</ComicInfo>").unwrap();
        let mut info = ComicInfo::open(dir.path());
        assert!(info.recovered());
        assert_eq!(info.get(Field::Title), None);
        info.set(Field::Title, "Fixed").unwrap();
        let reopened = ComicInfo::open(dir.path());
        assert!(!reopened.recovered());
        assert_eq!(reopened.get(Field::Title).as_deref(), Some("Fixed"));
    }

    #[test]
    fn unwritable_location_fails_to_persist() {
        let dir = tempfile::tempdir().unwrap();
        let book = dir.path().join("book");
        fs::create_dir(&book).unwrap();
        let mut info = ComicInfo::open(&book);
        fs::remove_dir(&book).unwrap();
        let err = info.set(Field::Title, "Lost").unwrap_err();
        assert_eq!(*err, ErrorKind::PersistenceFailed(book.join("ComicInfo.xml")));
    }
}
