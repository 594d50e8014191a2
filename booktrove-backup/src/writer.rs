//! Write a catalogue snapshot to a ZIP archive.
//!
//! Entry order: `info.json`, `styles.json`, `preferences.json`,
//! `books.json`, then one stored (uncompressed) entry per cover image.

use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use booktrove_catalog::{Book, cover_file_name, parse_utc};
use booktrove_db::{books_for_export, count_books_for_export, list_styles, now_utc};
use booktrove_lib::{Preferences, ProgressListener};
use chrono::Utc;
use rusqlite::Connection;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::ArchiveError;
use crate::info::ArchiveInfo;
use crate::options::{ExportOptions, RecordType};
use crate::records::{
    BOOKS_ENTRY, INFO_ENTRY, LAST_FULL_BACKUP_KEY, PREFERENCES_ENTRY, STYLES_ENTRY,
    cover_extension, encode,
};
use crate::results::ExportResults;

/// Progress steps besides books and covers: info, styles, preferences.
const EXTRA_STEPS: usize = 3;

pub struct ArchiveWriter {
    options: ExportOptions,
    covers_dir: PathBuf,
}

/// A cover to copy into the archive.
struct CoverSource {
    entry: String,
    path: PathBuf,
}

impl ArchiveWriter {
    pub fn new(options: ExportOptions, covers_dir: impl Into<PathBuf>) -> Self {
        Self {
            options,
            covers_dir: covers_dir.into(),
        }
    }

    /// Write the archive to `path`.
    ///
    /// The data goes to a sibling temporary file first, which replaces
    /// `path` only when something was written and the export was not
    /// cancelled.
    pub fn write_file(
        &self,
        conn: &Connection,
        prefs: &mut Preferences,
        path: &Path,
        progress: &dyn ProgressListener,
    ) -> Result<ExportResults, ArchiveError> {
        let tmp = tmp_path(path);
        let file = File::create(&tmp)?;
        match self.write(conn, prefs, BufWriter::new(file), progress) {
            Ok(results) if !results.is_empty() && !progress.is_cancelled() => {
                fs::rename(&tmp, path)?;
                Ok(results)
            }
            Ok(results) => {
                let _ = fs::remove_file(&tmp);
                Ok(results)
            }
            Err(e) => {
                let _ = fs::remove_file(&tmp);
                Err(e)
            }
        }
    }

    /// Write the archive to `sink`.
    ///
    /// When books are selected but none qualify (an incremental backup with
    /// nothing changed, or an empty catalogue), nothing is written and the
    /// returned results are empty.
    pub fn write<W: Write + Seek>(
        &self,
        conn: &Connection,
        prefs: &mut Preferences,
        sink: W,
        progress: &dyn ProgressListener,
    ) -> Result<ExportResults, ArchiveError> {
        let types = self.options.record_types;
        let with_books = types.contains(RecordType::Books);
        let with_covers = types.contains(RecordType::Covers);
        let mut results = ExportResults::default();

        let since = if self.options.incremental {
            prefs.get_str(LAST_FULL_BACKUP_KEY).and_then(parse_utc)
        } else {
            None
        };
        if let Some(since) = &since {
            log::info!("Incremental backup of books changed since {since}");
        }

        let mut books = Vec::new();
        let mut covers = Vec::new();
        if with_books || with_covers {
            let count = count_books_for_export(conn, since.as_ref())?;
            if count == 0 {
                log::info!("Nothing to back up");
                return Ok(results);
            }
            // Until the books are read, assume one cover per book.
            progress.set_max_pos(count * if with_covers { 2 } else { 1 } + EXTRA_STEPS);

            books = books_for_export(conn, since.as_ref())?;
            if with_covers {
                covers = self.collect_covers(&mut books);
            }
        }
        progress.set_max_pos(books.len() + covers.len() + EXTRA_STEPS);

        let deflated =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        let mut zip = ZipWriter::new(sink);

        let mut info = ArchiveInfo::new(Utc::now());
        info.book_count = with_books.then_some(books.len());
        info.cover_count = with_covers.then_some(covers.len());
        info.has_styles = types.contains(RecordType::Styles);
        info.has_preferences = types.contains(RecordType::Preferences);
        info.incremental = since.is_some();
        write_entry(&mut zip, INFO_ENTRY, &encode(&info)?, deflated)?;
        progress.publish_progress(1, Some("Archive info written"));

        if info.has_styles && !progress.is_cancelled() {
            let styles = list_styles(conn)?;
            write_entry(&mut zip, STYLES_ENTRY, &encode(&styles)?, deflated)?;
            results.styles = styles.len();
            progress.publish_progress(1, Some("Styles written"));
        }

        if info.has_preferences && !progress.is_cancelled() {
            write_entry(&mut zip, PREFERENCES_ENTRY, &encode(&*prefs)?, deflated)?;
            results.preferences = prefs.len();
            progress.publish_progress(1, Some("Preferences written"));
        }

        if with_books && !progress.is_cancelled() {
            write_entry(&mut zip, BOOKS_ENTRY, &encode(&books)?, deflated)?;
            results.books = books.iter().map(|b| b.id).collect();
            progress.publish_progress(books.len(), Some(&format!("{} books written", books.len())));
        }

        for cover in &covers {
            if progress.is_cancelled() {
                break;
            }
            match fs::read(&cover.path) {
                Ok(bytes) => {
                    write_entry(&mut zip, &cover.entry, &bytes, stored)?;
                    results.covers.push(cover.entry.clone());
                }
                Err(e) => {
                    log::warn!("Skipping cover {}: {}", cover.path.display(), e);
                    results.record_failure(0, e, Some(&cover.entry));
                }
            }
            progress.publish_progress(1, None);
        }

        let mut sink = zip.finish()?;
        sink.flush()?;

        if progress.is_cancelled() {
            log::info!("Backup cancelled");
        } else if with_books && since.is_none() {
            prefs.set_str(LAST_FULL_BACKUP_KEY, now_utc());
        }
        Ok(results)
    }

    /// Point each book's covers at their archive entry names and return the
    /// cover files that exist on disk.
    fn collect_covers(&self, books: &mut [Book]) -> Vec<CoverSource> {
        let mut sources = Vec::new();
        for book in books.iter_mut() {
            let mut entries = Vec::with_capacity(book.covers.len());
            for (position, file_name) in book.covers.iter().enumerate() {
                let path = self.covers_dir.join(file_name);
                let Some(ext) = cover_extension(file_name) else {
                    log::debug!("Ignoring non-image cover {file_name}");
                    continue;
                };
                if !path.is_file() {
                    log::debug!("Cover {} not found", path.display());
                    continue;
                }
                let entry = cover_file_name(&book.uuid, position, &ext);
                entries.push(entry.clone());
                sources.push(CoverSource { entry, path });
            }
            book.covers = entries;
        }
        sources
    }
}

fn write_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    bytes: &[u8],
    options: SimpleFileOptions,
) -> Result<(), ArchiveError> {
    zip.start_file(name, options)?;
    zip.write_all(bytes)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
