//! YAML loading for user-defined booklist styles.
//!
//! Each `.yaml`/`.yml` file in the styles directory holds one [`Style`].

use crate::types::Style;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum YamlError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("YAML parse error in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yml::Error,
    },
    #[error("Not a directory: {0}")]
    DirNotFound(String),
    #[error("Duplicate style uuid {uuid} in {path}")]
    DuplicateStyle { uuid: String, path: String },
}

/// Load all style definitions from a directory, sorted by file name.
///
/// A missing directory yields no styles. Styles loaded from disk are never
/// builtin, whatever the file says.
pub fn load_styles(dir: &Path) -> Result<Vec<Style>, YamlError> {
    let mut seen = HashSet::new();
    let mut styles = Vec::new();
    for (path, mut style) in load_yaml_dir::<Style>(dir)? {
        if !seen.insert(style.uuid.clone()) {
            return Err(YamlError::DuplicateStyle {
                uuid: style.uuid,
                path,
            });
        }
        style.builtin = false;
        styles.push(style);
    }
    Ok(styles)
}

/// Load a single style file.
pub fn load_style_file(path: &Path) -> Result<Style, YamlError> {
    let contents = std::fs::read_to_string(path).map_err(|e| YamlError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut style: Style = serde_yml::from_str(&contents).map_err(|e| YamlError::Parse {
        path: path.display().to_string(),
        source: e,
    })?;
    style.builtin = false;
    Ok(style)
}

/// Load every YAML file in a directory, each containing a single `T`.
fn load_yaml_dir<T: serde::de::DeserializeOwned>(
    dir: &Path,
) -> Result<Vec<(String, T)>, YamlError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    if !dir.is_dir() {
        return Err(YamlError::DirNotFound(dir.display().to_string()));
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| YamlError::Io {
            path: dir.display().to_string(),
            source: e,
        })?
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
        })
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        let path = entry.path();
        let contents = std::fs::read_to_string(&path).map_err(|e| YamlError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let item: T = serde_yml::from_str(&contents).map_err(|e| YamlError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;
        items.push((path.display().to_string(), item));
    }

    Ok(items)
}
