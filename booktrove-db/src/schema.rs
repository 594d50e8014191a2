//! SQLite schema creation and migration.

use booktrove_catalog::builtin_styles;
use rusqlite::{Connection, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration error: expected version {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
}

/// Current schema version. Increment when adding migrations.
pub const CURRENT_VERSION: i32 = 2;

/// Create all tables and indexes if they don't exist, and seed the
/// builtin styles.
///
/// This is idempotent, safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    seed_builtin_styles(conn)?;
    set_schema_version(conn, CURRENT_VERSION)?;
    Ok(())
}

/// Open or create a catalogue database at the given path.
pub fn open_database(path: &std::path::Path) -> Result<Connection, SchemaError> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    let version = get_schema_version(&conn)?;
    if version == 0 {
        log::debug!("Creating catalogue schema at {}", path.display());
        create_schema(&conn)?;
    } else if version != CURRENT_VERSION {
        migrate(&conn, version)?;
    }

    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Get the current schema version, or 0 if no schema exists.
pub fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run migrations from `from_version` up to `CURRENT_VERSION`.
fn migrate(conn: &Connection, from_version: i32) -> Result<(), SchemaError> {
    if from_version > CURRENT_VERSION {
        return Err(SchemaError::VersionMismatch {
            expected: CURRENT_VERSION,
            found: from_version,
        });
    }

    let mut version = from_version;
    while version < CURRENT_VERSION {
        log::info!("Migrating catalogue schema from version {version}");
        if version == 1 {
            conn.execute_batch(
                "ALTER TABLE series ADD COLUMN complete BOOLEAN NOT NULL DEFAULT 0;",
            )?;
        }
        version += 1;
        set_schema_version(conn, version)?;
    }

    Ok(())
}

fn seed_builtin_styles(conn: &Connection) -> Result<(), SchemaError> {
    for style in builtin_styles() {
        let groups = serde_json::to_string(&style.groups)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let sort = serde_json::to_string(&style.sort)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        conn.execute(
            "INSERT OR IGNORE INTO styles (uuid, name, preferred, groups, sort, show_covers, builtin)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)",
            params![
                style.uuid,
                style.name,
                style.preferred,
                groups,
                sort,
                style.show_covers
            ],
        )?;
    }
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    isbn TEXT,
    price_amount REAL,
    price_currency TEXT,
    language TEXT,
    format TEXT,
    date_published TEXT,
    description TEXT,
    date_added TEXT NOT NULL,
    last_updated TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_books_isbn ON books(isbn);
CREATE INDEX IF NOT EXISTS idx_books_last_updated ON books(last_updated);

CREATE TABLE IF NOT EXISTS authors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    family_name TEXT NOT NULL,
    given_names TEXT NOT NULL DEFAULT '',
    UNIQUE(family_name, given_names)
);

CREATE TABLE IF NOT EXISTS book_authors (
    book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
    author_id INTEGER NOT NULL REFERENCES authors(id),
    position INTEGER NOT NULL,
    PRIMARY KEY (book_id, author_id)
);

CREATE TABLE IF NOT EXISTS series (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL UNIQUE,
    complete BOOLEAN NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS book_series (
    book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
    series_id INTEGER NOT NULL REFERENCES series(id),
    number TEXT,
    position INTEGER NOT NULL,
    PRIMARY KEY (book_id, series_id)
);

CREATE TABLE IF NOT EXISTS publishers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS book_publishers (
    book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
    publisher_id INTEGER NOT NULL REFERENCES publishers(id),
    position INTEGER NOT NULL,
    PRIMARY KEY (book_id, publisher_id)
);

CREATE TABLE IF NOT EXISTS bookshelves (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    style_uuid TEXT
);

CREATE TABLE IF NOT EXISTS book_bookshelves (
    book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
    bookshelf_id INTEGER NOT NULL REFERENCES bookshelves(id) ON DELETE CASCADE,
    PRIMARY KEY (book_id, bookshelf_id)
);

-- Cover image file names; position 0 is the front cover
CREATE TABLE IF NOT EXISTS covers (
    book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    file_name TEXT NOT NULL,
    PRIMARY KEY (book_id, position)
);

-- Booklist styles; groups and sort are JSON
CREATE TABLE IF NOT EXISTS styles (
    uuid TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    preferred BOOLEAN NOT NULL DEFAULT 0,
    groups TEXT NOT NULL DEFAULT '[]',
    sort TEXT NOT NULL DEFAULT '"title_asc"',
    show_covers BOOLEAN NOT NULL DEFAULT 1,
    builtin BOOLEAN NOT NULL DEFAULT 0
);
"#;
