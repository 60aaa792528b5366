use crate::Format;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for Format {
    fn as_ref(&self) -> &'static str {
        self.as_str()
    }
}

impl Format {
    /// Returns the file extension for this format, without the leading dot.
    #[inline]
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Cbz => "cbz",
            Format::Cbr => "cbr",
            Format::Pdf => "pdf",
        }
    }

    /// Returns the short name for configuration (for displaying to user)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.extension()
    }

    /// `path` with its extension replaced by this format's extension.
    #[must_use]
    pub fn apply_to(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref().with_extension(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use crate::Format;
    use rstest::rstest;
    use std::path::Path;

    #[rstest]
    #[case(Format::Cbz, "cbz")]
    #[case(Format::Cbr, "cbr")]
    #[case(Format::Pdf, "pdf")]
    fn test_extension(#[case] format: Format, #[case] expected: &str) {
        assert_eq!(format.extension(), expected);
        assert_eq!(format.to_string(), expected);
        assert_eq!(expected.parse::<Format>().unwrap(), format);
    }

    #[rstest]
    #[case(Format::Pdf, "dir/book.cbz", "dir/book.pdf")]
    #[case(Format::Cbz, "Some.Comic.01.cbr", "Some.Comic.01.cbz")]
    #[case(Format::Cbr, "book.cbr", "book.cbr")]
    fn test_apply_to(#[case] format: Format, #[case] path: &str, #[case] expected: &str) {
        assert_eq!(format.apply_to(path), Path::new(expected));
    }
}
