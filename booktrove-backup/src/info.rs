//! The archive manifest, stored as `info.json`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ArchiveError;

/// Version written by this crate.
pub const ARCHIVE_VERSION: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveInfo {
    pub archive_version: u32,
    /// Version of the application that wrote the archive.
    #[serde(default)]
    pub app_version: String,
    pub created: DateTime<Utc>,
    /// Present when books were written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_count: Option<usize>,
    /// Present when covers were written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_count: Option<usize>,
    #[serde(default)]
    pub has_styles: bool,
    #[serde(default)]
    pub has_preferences: bool,
    #[serde(default)]
    pub incremental: bool,
}

impl ArchiveInfo {
    pub fn new(created: DateTime<Utc>) -> Self {
        Self {
            archive_version: ARCHIVE_VERSION,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            created,
            book_count: None,
            cover_count: None,
            has_styles: false,
            has_preferences: false,
            incremental: false,
        }
    }

    pub fn has_books(&self) -> bool {
        self.book_count.is_some_and(|n| n > 0)
    }

    pub fn has_covers(&self) -> bool {
        self.cover_count.is_some_and(|n| n > 0)
    }

    /// Check the archive version is one we can read.
    ///
    /// Version 2 passes here; `ArchiveReader::validate` additionally rejects
    /// version 2 archives in the CSV layout.
    pub fn validate(&self) -> Result<(), ArchiveError> {
        match self.archive_version {
            0 => Err(ArchiveError::invalid("archive version is missing")),
            1 => Err(ArchiveError::unsupported(1, "version 1 archives are no longer supported")),
            2..=ARCHIVE_VERSION => Ok(()),
            v => Err(ArchiveError::unsupported(
                v,
                format!("newest readable version is {ARCHIVE_VERSION}"),
            )),
        }
    }
}
