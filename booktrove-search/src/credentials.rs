//! API keys for search sites.
//!
//! Priority: environment variable, then `~/.config/booktrove/credentials.toml`.
//! Every key is optional; a site that needs one reports a credentials error
//! when it is used without it.

use std::fmt;
use std::path::{Path, PathBuf};

use booktrove_lib::settings::credentials_path;
use booktrove_lib::util::atomic_write;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;

pub const GOOGLE_BOOKS_KEY_ENV: &str = "BOOKTROVE_GOOGLE_BOOKS_KEY";

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub google_books_key: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("google_books_key", &self.google_books_key.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Where a key's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    EnvVar(&'static str),
    ConfigFile,
    Missing,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvVar(var) => write!(f, "env ${var}"),
            Self::ConfigFile => f.write_str("config file"),
            Self::Missing => f.write_str("not set"),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    googlebooks: Option<GoogleBooksConfig>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GoogleBooksConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

impl Credentials {
    /// Load from the environment and the default credentials file.
    pub fn load() -> Self {
        let env = std::env::var(GOOGLE_BOOKS_KEY_ENV).ok();
        Self::resolve(env, &credentials_path())
    }

    /// Combine an environment value with the file at `path`. The environment
    /// wins; blank values count as unset.
    pub fn resolve(env_value: Option<String>, path: &Path) -> Self {
        let file = load_from(path);
        let google_books_key = non_blank(env_value).or_else(|| {
            non_blank(file.googlebooks.and_then(|g| g.api_key))
        });
        Self { google_books_key }
    }

    pub fn has_google_books_key(&self) -> bool {
        self.google_books_key.is_some()
    }
}

/// Where the Google Books key would be loaded from.
pub fn credential_source() -> CredentialSource {
    let env = std::env::var(GOOGLE_BOOKS_KEY_ENV).ok();
    source_of(env.as_deref(), &credentials_path())
}

fn source_of(env_value: Option<&str>, path: &Path) -> CredentialSource {
    if env_value.is_some_and(|v| !v.trim().is_empty()) {
        return CredentialSource::EnvVar(GOOGLE_BOOKS_KEY_ENV);
    }
    let file = load_from(path);
    if non_blank(file.googlebooks.and_then(|g| g.api_key)).is_some() {
        CredentialSource::ConfigFile
    } else {
        CredentialSource::Missing
    }
}

/// Write `creds` to `path`. Returns the path written.
pub fn save_to_file(creds: &Credentials, path: &Path) -> Result<PathBuf, SearchError> {
    let config = ConfigFile {
        googlebooks: creds.google_books_key.clone().map(|key| GoogleBooksConfig {
            api_key: Some(key),
        }),
    };
    let text = toml::to_string_pretty(&config)
        .map_err(|e| SearchError::Config(format!("Failed to serialize credentials: {e}")))?;
    atomic_write(path, text.as_bytes())?;
    Ok(path.to_path_buf())
}

/// A missing or unreadable file gives empty credentials; a malformed one is
/// logged and ignored.
fn load_from(path: &Path) -> ConfigFile {
    let Ok(content) = std::fs::read_to_string(path) else {
        return ConfigFile::default();
    };
    toml::from_str(&content).unwrap_or_else(|e| {
        log::warn!("Ignoring malformed {}: {e}", path.display());
        ConfigFile::default()
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_beats_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        std::fs::write(&path, "[googlebooks]\napi_key = \"from-file\"\n").unwrap();

        let creds = Credentials::resolve(Some("from-env".into()), &path);
        assert_eq!(creds.google_books_key.as_deref(), Some("from-env"));
        assert_eq!(
            source_of(Some("from-env"), &path),
            CredentialSource::EnvVar(GOOGLE_BOOKS_KEY_ENV)
        );

        let creds = Credentials::resolve(Some("  ".into()), &path);
        assert_eq!(creds.google_books_key.as_deref(), Some("from-file"));
        assert_eq!(source_of(None, &path), CredentialSource::ConfigFile);
    }

    #[test]
    fn missing_or_malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        assert_eq!(Credentials::resolve(None, &path), Credentials::default());
        assert_eq!(source_of(None, &path), CredentialSource::Missing);

        std::fs::write(&path, "not = [valid").unwrap();
        assert!(!Credentials::resolve(None, &path).has_google_books_key());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.toml");
        let creds = Credentials {
            google_books_key: Some("abc123".into()),
        };
        save_to_file(&creds, &path).unwrap();
        assert_eq!(Credentials::resolve(None, &path), creds);
    }

    #[test]
    fn debug_hides_key() {
        let creds = Credentials {
            google_books_key: Some("secret".into()),
        };
        let shown = format!("{creds:?}");
        assert!(!shown.contains("secret"));
        assert!(shown.contains("***"));
    }
}
