use std::path::PathBuf;

/// Explicit locations of the external archivers.
///
/// Any tool left as `None` is discovered on `PATH` when it is first needed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tools {
    /// The `rar` executable, used to create `.cbr` files.
    pub rar: Option<PathBuf>,
    /// The `unrar` executable, used to extract `.cbr` files.
    pub unrar: Option<PathBuf>,
}
impl Tools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rar(mut self, path: impl Into<PathBuf>) -> Self {
        self.rar = Some(path.into());
        self
    }

    pub fn with_unrar(mut self, path: impl Into<PathBuf>) -> Self {
        self.unrar = Some(path.into());
        self
    }
}
