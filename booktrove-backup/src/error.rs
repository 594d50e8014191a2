use thiserror::Error;

use booktrove_db::OperationError;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Not a valid backup archive: {0}")]
    InvalidArchive(String),
    #[error("Unsupported archive version {version}: {reason}")]
    UnsupportedVersion { version: u32, reason: String },
    #[error("Corrupt archive entry '{entry}': {reason}")]
    CorruptEntry { entry: String, reason: String },
    #[error("Archive has no info entry")]
    MissingInfo,
    #[error("Archive must be validated before it is read")]
    NotValidated,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl ArchiveError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArchive(reason.into())
    }

    pub fn corrupt(entry: &str, reason: impl ToString) -> Self {
        Self::CorruptEntry {
            entry: entry.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn unsupported(version: u32, reason: impl Into<String>) -> Self {
        Self::UnsupportedVersion {
            version,
            reason: reason.into(),
        }
    }
}
