//! Backup and restore of the book catalogue as ZIP archives.
//!
//! An archive holds a manifest (`info.json`), one JSON entry per data
//! category, and the cover images. [`ArchiveWriter`] produces one from the
//! catalogue; [`ArchiveReader`] validates one and merges it back in,
//! counting what happened in [`ImportResults`].

pub mod container;
pub mod error;
pub mod info;
pub mod options;
pub mod reader;
pub mod records;
pub mod results;
pub mod writer;

pub use container::ArchiveContainer;
pub use error::ArchiveError;
pub use info::{ARCHIVE_VERSION, ArchiveInfo};
pub use options::{ExportOptions, ImportOptions, RecordType, RecordTypes, UpdatePolicy};
pub use reader::{ArchiveReader, MAX_ENTRY_BYTES};
pub use records::LAST_FULL_BACKUP_KEY;
pub use results::{ExportResults, FailureDetail, ImportResults, MAX_FAILURE_DETAILS};
pub use writer::ArchiveWriter;
