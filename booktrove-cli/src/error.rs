use booktrove_backup::ArchiveError;
use booktrove_catalog::YamlError;
use booktrove_db::{OperationError, SchemaError};
use booktrove_lib::ConfigError;
use booktrove_search::SearchError;
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Opening or migrating the catalogue database failed
    #[error("Database error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Database error: {0}")]
    Database(#[from] OperationError),

    #[error("Backup error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Style error: {0}")]
    Style(#[from] YamlError),

    /// A bad argument value the parser could not catch
    #[error("{0}")]
    Invalid(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl CliError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}
