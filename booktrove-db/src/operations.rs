//! CRUD operations for books and the entities they reference.

use booktrove_catalog::{Author, Book, Bookshelf, Style, parse_utc};
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use crate::queries::load_book_where;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
    #[error("Invalid {entity_type}: {reason}")]
    Invalid {
        entity_type: &'static str,
        reason: String,
    },
    #[error("Style data error: {0}")]
    StyleJson(#[from] serde_json::Error),
}

impl OperationError {
    pub fn not_found(entity_type: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}

/// Current time in the canonical stored form (`2024-03-01T10:00:00Z`).
pub fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Normalize a timestamp to the canonical stored form so string comparison
/// orders correctly. Unparseable input yields `None`.
pub fn canonical_timestamp(s: &str) -> Option<String> {
    parse_utc(s).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

// ── Book Operations ─────────────────────────────────────────────────────────

/// Insert a book and its authors, series, publishers, shelves and covers.
///
/// Reuses `book.uuid` when set, otherwise generates one. `date_added` and
/// `last_updated` are kept when present and valid, otherwise set to now.
/// Returns the new row id.
pub fn insert_book(conn: &Connection, book: &Book) -> Result<i64, OperationError> {
    validate_book(book)?;

    let uuid = if book.uuid.is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        book.uuid.clone()
    };
    let now = now_utc();
    let date_added = canonical_timestamp(&book.date_added).unwrap_or_else(|| now.clone());
    let last_updated = canonical_timestamp(&book.last_updated).unwrap_or(now);

    conn.execute(
        "INSERT INTO books (uuid, title, isbn, price_amount, price_currency, language,
                            format, date_published, description, date_added, last_updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            uuid,
            book.title.trim(),
            book.isbn,
            book.price.as_ref().map(|p| p.amount),
            book.price.as_ref().map(|p| p.currency.as_str()),
            book.language,
            book.format,
            book.date_published,
            book.description,
            date_added,
            last_updated,
        ],
    )?;
    let id = conn.last_insert_rowid();
    write_book_links(conn, id, book)?;
    Ok(id)
}

/// Replace a book's fields and child lists.
///
/// With `keep_last_updated`, the incoming `last_updated` is stored as-is
/// (used when importing); otherwise it is bumped to now. `uuid` and
/// `date_added` never change.
pub fn update_book(
    conn: &Connection,
    id: i64,
    book: &Book,
    keep_last_updated: bool,
) -> Result<(), OperationError> {
    validate_book(book)?;

    let last_updated = if keep_last_updated {
        canonical_timestamp(&book.last_updated).unwrap_or_else(now_utc)
    } else {
        now_utc()
    };

    let changed = conn.execute(
        "UPDATE books SET title = ?2, isbn = ?3, price_amount = ?4, price_currency = ?5,
                          language = ?6, format = ?7, date_published = ?8,
                          description = ?9, last_updated = ?10
         WHERE id = ?1",
        params![
            id,
            book.title.trim(),
            book.isbn,
            book.price.as_ref().map(|p| p.amount),
            book.price.as_ref().map(|p| p.currency.as_str()),
            book.language,
            book.format,
            book.date_published,
            book.description,
            last_updated,
        ],
    )?;
    if changed == 0 {
        return Err(OperationError::not_found("book", id));
    }

    for table in [
        "book_authors",
        "book_series",
        "book_publishers",
        "book_bookshelves",
        "covers",
    ] {
        conn.execute(&format!("DELETE FROM {table} WHERE book_id = ?1"), [id])?;
    }
    write_book_links(conn, id, book)?;
    Ok(())
}

/// Delete a book. Returns `false` if there was no such book.
pub fn delete_book(conn: &Connection, id: i64) -> Result<bool, OperationError> {
    let changed = conn.execute("DELETE FROM books WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

/// Load a book by row id.
pub fn find_book_by_id(conn: &Connection, id: i64) -> Result<Option<Book>, OperationError> {
    Ok(load_book_where(conn, "b.id = ?1", &id)?.pop())
}

/// Load a book by uuid.
pub fn find_book_by_uuid(conn: &Connection, uuid: &str) -> Result<Option<Book>, OperationError> {
    Ok(load_book_where(conn, "b.uuid = ?1", &uuid)?.pop())
}

/// Row id of the book with this uuid.
pub fn book_id_by_uuid(conn: &Connection, uuid: &str) -> Result<Option<i64>, OperationError> {
    let result = conn.query_row("SELECT id FROM books WHERE uuid = ?1", [uuid], |row| {
        row.get::<_, i64>(0)
    });
    match result {
        Ok(id) => Ok(Some(id)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn validate_book(book: &Book) -> Result<(), OperationError> {
    if book.title.trim().is_empty() {
        return Err(OperationError::Invalid {
            entity_type: "book",
            reason: "title is required".into(),
        });
    }
    Ok(())
}

fn write_book_links(conn: &Connection, book_id: i64, book: &Book) -> Result<(), OperationError> {
    for (pos, author) in book.authors.iter().enumerate() {
        let author_id = upsert_author(conn, author)?;
        conn.execute(
            "INSERT OR IGNORE INTO book_authors (book_id, author_id, position) VALUES (?1, ?2, ?3)",
            params![book_id, author_id, pos as i64],
        )?;
    }
    for (pos, entry) in book.series.iter().enumerate() {
        let series_id = upsert_series(conn, &entry.title)?;
        conn.execute(
            "INSERT OR IGNORE INTO book_series (book_id, series_id, number, position)
             VALUES (?1, ?2, ?3, ?4)",
            params![book_id, series_id, entry.number, pos as i64],
        )?;
    }
    for (pos, name) in book.publishers.iter().enumerate() {
        let publisher_id = upsert_publisher(conn, name)?;
        conn.execute(
            "INSERT OR IGNORE INTO book_publishers (book_id, publisher_id, position)
             VALUES (?1, ?2, ?3)",
            params![book_id, publisher_id, pos as i64],
        )?;
    }
    for name in &book.bookshelves {
        let shelf_id = upsert_bookshelf(
            conn,
            &Bookshelf {
                id: 0,
                name: name.clone(),
                style_uuid: None,
            },
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO book_bookshelves (book_id, bookshelf_id) VALUES (?1, ?2)",
            params![book_id, shelf_id],
        )?;
    }
    for (pos, file_name) in book.covers.iter().enumerate() {
        conn.execute(
            "INSERT INTO covers (book_id, position, file_name) VALUES (?1, ?2, ?3)",
            params![book_id, pos as i64, file_name],
        )?;
    }
    Ok(())
}

// ── Author / Series / Publisher ─────────────────────────────────────────────

/// Find or create an author. Returns the author id.
pub fn upsert_author(conn: &Connection, author: &Author) -> Result<i64, OperationError> {
    let family = author.family_name.trim();
    if family.is_empty() {
        return Err(OperationError::Invalid {
            entity_type: "author",
            reason: "family name is required".into(),
        });
    }
    conn.execute(
        "INSERT OR IGNORE INTO authors (family_name, given_names) VALUES (?1, ?2)",
        params![family, author.given_names.trim()],
    )?;
    let id = conn.query_row(
        "SELECT id FROM authors WHERE family_name = ?1 AND given_names = ?2",
        params![family, author.given_names.trim()],
        |row| row.get(0),
    )?;
    Ok(id)
}

/// Find or create a series by title. Returns the series id.
pub fn upsert_series(conn: &Connection, title: &str) -> Result<i64, OperationError> {
    upsert_named(conn, "series", "title", title)
}

/// Find or create a publisher by name. Returns the publisher id.
pub fn upsert_publisher(conn: &Connection, name: &str) -> Result<i64, OperationError> {
    upsert_named(conn, "publishers", "name", name)
}

/// Mark a series complete or incomplete.
pub fn set_series_complete(
    conn: &Connection,
    title: &str,
    complete: bool,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE series SET complete = ?2 WHERE title = ?1",
        params![title, complete],
    )?;
    if changed == 0 {
        return Err(OperationError::not_found("series", title));
    }
    Ok(())
}

fn upsert_named(
    conn: &Connection,
    table: &'static str,
    column: &'static str,
    value: &str,
) -> Result<i64, OperationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(OperationError::Invalid {
            entity_type: table,
            reason: format!("{column} is required"),
        });
    }
    conn.execute(
        &format!("INSERT OR IGNORE INTO {table} ({column}) VALUES (?1)"),
        [value],
    )?;
    let id = conn.query_row(
        &format!("SELECT id FROM {table} WHERE {column} = ?1"),
        [value],
        |row| row.get(0),
    )?;
    Ok(id)
}

// ── Bookshelf Operations ────────────────────────────────────────────────────

/// Insert a bookshelf, or update its style if one with this name exists.
/// A `None` style leaves an existing shelf's style untouched.
pub fn upsert_bookshelf(conn: &Connection, shelf: &Bookshelf) -> Result<i64, OperationError> {
    let name = shelf.name.trim();
    if name.is_empty() {
        return Err(OperationError::Invalid {
            entity_type: "bookshelf",
            reason: "name is required".into(),
        });
    }
    conn.execute(
        "INSERT INTO bookshelves (name, style_uuid) VALUES (?1, ?2)
         ON CONFLICT(name) DO UPDATE SET
             style_uuid = COALESCE(excluded.style_uuid, bookshelves.style_uuid)",
        params![name, shelf.style_uuid],
    )?;
    let id = conn.query_row(
        "SELECT id FROM bookshelves WHERE name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(id)
}

// ── Style Operations ────────────────────────────────────────────────────────

/// Insert or update a style by uuid. Builtin styles keep their name and
/// builtin flag; only their preferences change.
pub fn upsert_style(conn: &Connection, style: &Style) -> Result<(), OperationError> {
    if style.uuid.trim().is_empty() {
        return Err(OperationError::Invalid {
            entity_type: "style",
            reason: "uuid is required".into(),
        });
    }
    let groups = serde_json::to_string(&style.groups)?;
    let sort = serde_json::to_string(&style.sort)?;
    conn.execute(
        "INSERT INTO styles (uuid, name, preferred, groups, sort, show_covers, builtin)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)
         ON CONFLICT(uuid) DO UPDATE SET
             name = CASE WHEN styles.builtin THEN styles.name ELSE excluded.name END,
             preferred = excluded.preferred,
             groups = excluded.groups,
             sort = excluded.sort,
             show_covers = excluded.show_covers",
        params![
            style.uuid,
            style.name,
            style.preferred,
            groups,
            sort,
            style.show_covers
        ],
    )?;
    Ok(())
}

/// Delete a user style. Builtin styles cannot be deleted.
/// Returns `false` if there was no such style.
pub fn delete_style(conn: &Connection, uuid: &str) -> Result<bool, OperationError> {
    let builtin: Option<bool> = conn
        .query_row(
            "SELECT builtin FROM styles WHERE uuid = ?1",
            [uuid],
            |row| row.get(0),
        )
        .optional()?;
    match builtin {
        None => Ok(false),
        Some(true) => Err(OperationError::Invalid {
            entity_type: "style",
            reason: format!("builtin style '{uuid}' cannot be deleted"),
        }),
        Some(false) => {
            conn.execute(
                "UPDATE bookshelves SET style_uuid = NULL WHERE style_uuid = ?1",
                [uuid],
            )?;
            conn.execute("DELETE FROM styles WHERE uuid = ?1", [uuid])?;
            Ok(true)
        }
    }
}
