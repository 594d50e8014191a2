//! Read a ZIP archive back into the catalogue.
//!
//! Reading is two-phase: [`ArchiveReader::validate`] looks only at
//! `info.json`; [`ArchiveReader::read`] then decodes every selected JSON
//! entry before touching the catalogue, so a corrupt entry leaves it
//! unchanged.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use booktrove_catalog::{Book, Style, parse_cover_file_name};
use booktrove_db::{book_id_by_uuid, find_book_by_id, insert_book, update_book, upsert_style};
use booktrove_lib::util::atomic_write;
use booktrove_lib::{Preferences, ProgressListener};
use rusqlite::Connection;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::container::ArchiveContainer;
use crate::error::ArchiveError;
use crate::info::ArchiveInfo;
use crate::options::{ImportOptions, RecordType, UpdatePolicy};
use crate::records::{
    BOOKS_ENTRY, INFO_ENTRY, LAST_FULL_BACKUP_KEY, PREFERENCES_ENTRY, STYLES_ENTRY, decode,
    is_cover_entry,
};
use crate::results::ImportResults;

/// Progress steps besides books and covers: styles, preferences.
const EXTRA_STEPS: usize = 2;

/// Largest entry we will inflate. Declared sizes above this are rejected
/// before any allocation.
pub const MAX_ENTRY_BYTES: u64 = 256 * 1024 * 1024;

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOC: u64 = 1024 * 1024;

/// Book list of the older CSV-based version 2 layout.
const LEGACY_BOOKS_CSV: &str = "books.csv";

pub struct ArchiveReader<R: Read + Seek> {
    zip: ZipArchive<R>,
    info: Option<ArchiveInfo>,
    validated: bool,
}

/// The decoded JSON entries of an archive.
#[derive(Default)]
struct Payload {
    styles: Option<Vec<Style>>,
    preferences: Option<Preferences>,
    books: Option<Vec<Book>>,
}

enum BookImport {
    Created,
    Updated,
    Skipped,
}

impl ArchiveReader<BufReader<File>> {
    /// Open an archive file.
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        Self::new(BufReader::new(File::open(path)?))
    }
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Wrap a reader, checking that it holds a ZIP container.
    pub fn new(mut reader: R) -> Result<Self, ArchiveError> {
        let container = ArchiveContainer::detect_reader(&mut reader)?;
        if !container.is_supported() {
            return Err(ArchiveError::invalid(format!(
                "{} is not a supported backup format",
                container.name()
            )));
        }
        let zip = ZipArchive::new(reader).map_err(|e| match e {
            ZipError::InvalidArchive(msg) => ArchiveError::invalid(msg.to_string()),
            other => ArchiveError::Zip(other),
        })?;
        Ok(Self {
            zip,
            info: None,
            validated: false,
        })
    }

    /// Read the manifest only. The payload entries are not touched.
    pub fn read_info(&mut self) -> Result<&ArchiveInfo, ArchiveError> {
        if self.info.is_none() {
            let bytes = self
                .entry_bytes(INFO_ENTRY)?
                .ok_or(ArchiveError::MissingInfo)?;
            self.info = Some(decode(INFO_ENTRY, &bytes)?);
        }
        self.info.as_ref().ok_or(ArchiveError::MissingInfo)
    }

    /// Read the manifest and check its version is supported.
    ///
    /// Version 2 archives are only readable when they already use the JSON
    /// entries; the CSV layout most of them carry is rejected here.
    pub fn validate(&mut self) -> Result<&ArchiveInfo, ArchiveError> {
        let info = self.read_info()?;
        info.validate()?;
        let version = info.archive_version;
        if version < 3 && self.zip.index_for_name(LEGACY_BOOKS_CSV).is_some() {
            return Err(ArchiveError::unsupported(
                version,
                "CSV book lists are not supported; re-export with a newer version",
            ));
        }
        self.validated = true;
        self.info.as_ref().ok_or(ArchiveError::MissingInfo)
    }

    /// Merge the archive into the catalogue, the preferences store and the
    /// covers directory.
    ///
    /// Requires a prior successful [`validate`](Self::validate).
    pub fn read(
        &mut self,
        conn: &mut Connection,
        prefs: &mut Preferences,
        covers_dir: &Path,
        options: &ImportOptions,
        progress: &dyn ProgressListener,
    ) -> Result<ImportResults, ArchiveError> {
        if !self.validated {
            return Err(ArchiveError::NotValidated);
        }
        let types = options.record_types;
        let mut results = ImportResults::default();

        let payload = self.decode_payload(options)?;
        let cover_entries: Vec<String> = if types.contains(RecordType::Covers) {
            self.zip
                .file_names()
                .filter(|n| is_cover_entry(n))
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };
        let book_total = payload.books.as_ref().map_or(0, Vec::len);
        progress.set_max_pos(book_total + cover_entries.len() + EXTRA_STEPS);

        let mut tx = conn.transaction()?;

        if let Some(styles) = payload.styles.as_ref().filter(|_| !progress.is_cancelled()) {
            for style in styles {
                upsert_style(&tx, style)?;
            }
            results.styles = styles.len();
            progress.publish_progress(1, Some("Styles restored"));
        }

        let mut touched = HashSet::new();
        if let Some(books) = &payload.books {
            for (i, book) in books.iter().enumerate() {
                if progress.is_cancelled() {
                    break;
                }
                results.books_processed += 1;
                let row = i + 1;
                let savepoint = tx.savepoint()?;
                match import_book(&savepoint, book, options.policy) {
                    Ok(outcome) => {
                        savepoint.commit()?;
                        match outcome {
                            BookImport::Created => results.books_created += 1,
                            BookImport::Updated => results.books_updated += 1,
                            BookImport::Skipped => {
                                results.books_skipped += 1;
                                progress.publish_progress(1, None);
                                continue;
                            }
                        }
                        touched.insert(book.uuid.clone());
                    }
                    Err(e) => {
                        // Dropping the savepoint rolls back this row only.
                        drop(savepoint);
                        log::warn!("Book row {row} ('{}') failed: {e}", book.title);
                        results.record_failure(row, e, Some(&book.title));
                    }
                }
                progress.publish_progress(1, None);
            }
        }
        tx.commit()?;

        let preferences = payload
            .preferences
            .as_ref()
            .filter(|_| !progress.is_cancelled());
        if let Some(incoming) = preferences {
            let mut incoming = incoming.clone();
            incoming.remove(LAST_FULL_BACKUP_KEY);
            results.preferences = prefs.merge(&incoming);
            progress.publish_progress(1, Some("Preferences restored"));
        }

        for name in &cover_entries {
            if progress.is_cancelled() {
                break;
            }
            results.covers_processed += 1;
            self.restore_cover(name, covers_dir, &touched, &mut results);
            progress.publish_progress(1, None);
        }

        log::info!(
            "Import: {} books created, {} updated, {} skipped, {} failed",
            results.books_created,
            results.books_updated,
            results.books_skipped,
            results.books_failed
        );
        Ok(results)
    }

    fn decode_payload(&mut self, options: &ImportOptions) -> Result<Payload, ArchiveError> {
        let types = options.record_types;
        let mut payload = Payload::default();
        if types.contains(RecordType::Styles) {
            if let Some(bytes) = self.entry_bytes(STYLES_ENTRY)? {
                payload.styles = Some(decode(STYLES_ENTRY, &bytes)?);
            }
        }
        if types.contains(RecordType::Preferences) {
            if let Some(bytes) = self.entry_bytes(PREFERENCES_ENTRY)? {
                payload.preferences = Some(decode(PREFERENCES_ENTRY, &bytes)?);
            }
        }
        if types.contains(RecordType::Books) {
            if let Some(bytes) = self.entry_bytes(BOOKS_ENTRY)? {
                payload.books = Some(decode(BOOKS_ENTRY, &bytes)?);
            }
        }
        Ok(payload)
    }

    /// Copy one cover into `covers_dir`. An existing file is only replaced
    /// when its book was created or updated by this import.
    fn restore_cover(
        &mut self,
        name: &str,
        covers_dir: &Path,
        touched: &HashSet<String>,
        results: &mut ImportResults,
    ) {
        let dest = covers_dir.join(name);
        let exists = dest.is_file();
        let owner_changed =
            parse_cover_file_name(name).is_some_and(|(uuid, _)| touched.contains(&uuid));
        if exists && !owner_changed {
            results.covers_skipped += 1;
            return;
        }

        let written = self
            .entry_bytes(name)
            .and_then(|bytes| bytes.ok_or_else(|| ArchiveError::corrupt(name, "entry vanished")))
            .and_then(|bytes| {
                fs::create_dir_all(covers_dir)?;
                atomic_write(&dest, &bytes)?;
                Ok(())
            });
        match written {
            Ok(()) if exists => results.covers_updated += 1,
            Ok(()) => results.covers_created += 1,
            Err(e) => {
                log::warn!("Cover {name} failed: {e}");
                results.record_cover_failure(name, e);
            }
        }
    }

    /// The bytes of an entry, or `None` if the archive has no such entry.
    fn entry_bytes(&mut self, name: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        let file = match self.zip.by_name(name) {
            Ok(f) => f,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(ArchiveError::corrupt(name, e)),
        };
        let declared = file.size();
        if declared > MAX_ENTRY_BYTES {
            return Err(ArchiveError::corrupt(
                name,
                format!("declared size {declared} exceeds {MAX_ENTRY_BYTES} bytes"),
            ));
        }
        // The declared size may lie, so cap both the reservation and the read.
        let mut bytes = Vec::with_capacity(declared.min(MAX_PREALLOC) as usize);
        file.take(MAX_ENTRY_BYTES + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| ArchiveError::corrupt(name, e))?;
        if bytes.len() as u64 > MAX_ENTRY_BYTES {
            return Err(ArchiveError::corrupt(
                name,
                format!("entry exceeds {MAX_ENTRY_BYTES} bytes"),
            ));
        }
        Ok(Some(bytes))
    }
}

/// Insert or merge one incoming book according to `policy`.
fn import_book(
    conn: &Connection,
    book: &Book,
    policy: UpdatePolicy,
) -> Result<BookImport, ArchiveError> {
    let existing = if book.uuid.is_empty() {
        None
    } else {
        book_id_by_uuid(conn, &book.uuid)?
    };
    let Some(id) = existing else {
        insert_book(conn, book)?;
        return Ok(BookImport::Created);
    };

    let replace = match policy {
        UpdatePolicy::Skip => false,
        UpdatePolicy::Overwrite => true,
        UpdatePolicy::Sync => {
            let local = find_book_by_id(conn, id)?.and_then(|b| b.last_updated_utc());
            match (book.last_updated_utc(), local) {
                (Some(incoming), Some(local)) => incoming > local,
                (Some(_), None) => true,
                (None, _) => false,
            }
        }
    };
    if !replace {
        return Ok(BookImport::Skipped);
    }
    update_book(conn, id, book, true)?;
    Ok(BookImport::Updated)
}
