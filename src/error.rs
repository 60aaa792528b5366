use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("configuration error")]
    Config,
    #[display("could not process {}", _0.display())]
    Book(#[error(not(source))] PathBuf),
    #[display("could not update metadata of {}", _0.display())]
    Metadata(#[error(not(source))] PathBuf),
    /// No target format was given and none is configured.
    #[display("no target format: pass --to or set `output` in the configuration")]
    NoTarget,
    #[display("could not list {}", _0.display())]
    List(#[error(not(source))] PathBuf),
}
