//! Archive container detection by magic bytes.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// How many leading bytes [`ArchiveContainer::detect`] looks at.
pub const HEADER_LEN: usize = 512;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const SQLITE_MAGIC: &[u8] = b"SQLite format 3\0";
const TAR_MAGIC_OFFSET: usize = 0x101;
const TAR_MAGIC: &[u8] = b"ustar";
const XML_MAGIC: &[u8] = b"<?xml ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveContainer {
    Zip,
    SqliteDb,
    Tar,
    Xml,
    Unknown,
}

impl ArchiveContainer {
    pub fn detect(header: &[u8]) -> Self {
        if header.starts_with(ZIP_MAGIC) {
            Self::Zip
        } else if header.starts_with(SQLITE_MAGIC) {
            Self::SqliteDb
        } else if header
            .get(TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + TAR_MAGIC.len())
            .is_some_and(|m| m == TAR_MAGIC)
        {
            Self::Tar
        } else if header.starts_with(XML_MAGIC) {
            Self::Xml
        } else {
            Self::Unknown
        }
    }

    /// Sniff the container of a seekable reader, leaving it rewound.
    pub fn detect_reader<R: Read + Seek>(reader: &mut R) -> io::Result<Self> {
        let mut header = Vec::with_capacity(HEADER_LEN);
        reader.by_ref().take(HEADER_LEN as u64).read_to_end(&mut header)?;
        reader.seek(SeekFrom::Start(0))?;
        Ok(Self::detect(&header))
    }

    pub fn detect_file(path: &Path) -> io::Result<Self> {
        Self::detect_reader(&mut File::open(path)?)
    }

    /// Only ZIP archives can be read and written.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Zip)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Zip => "ZIP archive",
            Self::SqliteDb => "SQLite database",
            Self::Tar => "tar archive",
            Self::Xml => "XML document",
            Self::Unknown => "unknown format",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_known_signatures() {
        assert_eq!(ArchiveContainer::detect(b"PK\x03\x04rest"), ArchiveContainer::Zip);
        assert_eq!(
            ArchiveContainer::detect(b"SQLite format 3\0...."),
            ArchiveContainer::SqliteDb
        );
        assert_eq!(
            ArchiveContainer::detect(b"<?xml version=\"1.0\"?>"),
            ArchiveContainer::Xml
        );

        let mut tar = vec![0u8; HEADER_LEN];
        tar[TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + 5].copy_from_slice(b"ustar");
        assert_eq!(ArchiveContainer::detect(&tar), ArchiveContainer::Tar);
    }

    #[test]
    fn short_or_unknown_input() {
        assert_eq!(ArchiveContainer::detect(b""), ArchiveContainer::Unknown);
        assert_eq!(ArchiveContainer::detect(b"PK"), ArchiveContainer::Unknown);
        assert!(!ArchiveContainer::Tar.is_supported());
        assert!(ArchiveContainer::Zip.is_supported());
    }

    #[test]
    fn reader_is_rewound() {
        let mut cursor = io::Cursor::new(b"PK\x03\x04abcdef".to_vec());
        assert_eq!(
            ArchiveContainer::detect_reader(&mut cursor).unwrap(),
            ArchiveContainer::Zip
        );
        assert_eq!(cursor.position(), 0);
    }
}
