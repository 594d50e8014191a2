//! Archive entry names and JSON record codecs.

use booktrove_catalog::{is_cover_extension, parse_cover_file_name};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ArchiveError;

pub const INFO_ENTRY: &str = "info.json";
pub const STYLES_ENTRY: &str = "styles.json";
pub const PREFERENCES_ENTRY: &str = "preferences.json";
pub const BOOKS_ENTRY: &str = "books.json";

/// Preference key holding the date of the last full backup.
pub const LAST_FULL_BACKUP_KEY: &str = "backup.last.full";

pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, ArchiveError> {
    Ok(serde_json::to_vec_pretty(value)?)
}

/// Decode an entry's bytes. Any parse error makes the entry corrupt.
pub(crate) fn decode<T: DeserializeOwned>(entry: &str, bytes: &[u8]) -> Result<T, ArchiveError> {
    serde_json::from_slice(bytes).map_err(|e| ArchiveError::corrupt(entry, e))
}

/// Whether an archive entry name is a cover image.
pub fn is_cover_entry(name: &str) -> bool {
    !name.contains('/') && parse_cover_file_name(name).is_some()
}

/// The extension of a stored cover file, lowercased, if it is an image type
/// we keep.
pub fn cover_extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    is_cover_extension(ext).then(|| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_entries() {
        assert!(is_cover_entry("0b7c-11.jpg"));
        assert!(is_cover_entry("0b7c-11_1.png"));
        assert!(!is_cover_entry(BOOKS_ENTRY));
        assert!(!is_cover_entry("covers/0b7c.jpg"));
        assert_eq!(cover_extension("x.JPEG").as_deref(), Some("jpeg"));
        assert_eq!(cover_extension("x.gif"), None);
    }

    #[test]
    fn decode_errors_name_the_entry() {
        let err = decode::<Vec<u32>>(BOOKS_ENTRY, b"[1, 2,").unwrap_err();
        match err {
            ArchiveError::CorruptEntry { entry, .. } => assert_eq!(entry, BOOKS_ENTRY),
            other => panic!("unexpected {other:?}"),
        }
    }
}
