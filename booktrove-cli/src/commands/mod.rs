pub(crate) mod archive;
pub(crate) mod books;
pub(crate) mod config;
pub(crate) mod search;
pub(crate) mod sites;

use std::path::PathBuf;

use booktrove_lib::settings::preferences_path;
use booktrove_lib::{Canceller, Preferences, Settings};
use rusqlite::Connection;

use crate::CliError;

/// Where the catalogue lives, after CLI overrides and settings.toml.
#[derive(Debug, Clone)]
pub(crate) struct Paths {
    pub db: PathBuf,
    pub covers: PathBuf,
    pub prefs: PathBuf,
}

impl Paths {
    pub(crate) fn resolve(db: Option<PathBuf>, covers: Option<PathBuf>) -> Self {
        let settings = Settings::load();
        Self {
            db: settings.resolve_db_path(db),
            covers: settings.resolve_covers_dir(covers),
            prefs: preferences_path(),
        }
    }

    /// Open (or create) the catalogue database.
    pub(crate) fn open_catalog(&self) -> Result<Connection, CliError> {
        if let Some(parent) = self.db.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        log::debug!("Opening catalogue {}", self.db.display());
        Ok(booktrove_db::open_database(&self.db)?)
    }

    pub(crate) fn load_prefs(&self) -> Result<Preferences, CliError> {
        Ok(Preferences::load(&self.prefs)?)
    }
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {e}")))
}

/// Cancel through `canceller` when the user presses Ctrl-C.
pub(crate) fn cancel_on_ctrl_c(canceller: Canceller) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Cancelling...");
            canceller.cancel();
        }
    });
}

/// Truncate a string to a maximum width, appending "..." if needed.
pub(crate) fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
