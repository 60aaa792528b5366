//! Open, edit and safely repack comic book archives.
//!
//! A [`Book`] is unpacked into a private scratch directory when opened. Any
//! file in that directory can then be edited, and the `ComicInfo.xml`
//! metadata is available through [`Book::metadata_mut`]. Closing compares the
//! directory against a [`Snapshot`] taken right after unpacking and repacks
//! only if something changed (or a different output format was chosen). The
//! previous archive is always kept as `<name>.<ext>.bak`.
//!
//! ```text
//! Book<Closed> --open()--> Book<Open> --close()--> Outcome
//! ```

mod backup;
mod book;
pub mod error;
mod scan;
mod snapshot;

pub use crate::backup::backup_path;
pub use crate::book::{Book, Closed, Open, Outcome, State};
pub use crate::scan::find_books;
pub use crate::snapshot::Snapshot;
pub use comix_container::{Format, Tools};
pub use comix_metadata::{ComicInfo, Field};
