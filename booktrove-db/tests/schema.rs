use booktrove_db::open_memory;
use booktrove_db::schema::{CURRENT_VERSION, create_schema, get_schema_version, open_database};
use tempfile::TempDir;

#[test]
fn create_schema_in_memory() {
    let conn = open_memory().unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
}

#[test]
fn schema_is_idempotent() {
    let conn = open_memory().unwrap();
    create_schema(&conn).unwrap();
    let styles: i64 = conn
        .query_row("SELECT COUNT(*) FROM styles WHERE builtin = 1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(styles as usize, booktrove_catalog::builtin_styles().len());
}

#[test]
fn foreign_keys_enabled() {
    let conn = open_memory().unwrap();
    let fk: i32 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(fk, 1);
}

#[test]
fn all_tables_exist() {
    let conn = open_memory().unwrap();
    let tables = [
        "schema_version",
        "books",
        "authors",
        "book_authors",
        "series",
        "book_series",
        "publishers",
        "book_publishers",
        "bookshelves",
        "book_bookshelves",
        "covers",
        "styles",
    ];
    for table in tables {
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert!(exists, "table '{}' should exist", table);
    }
}

#[test]
fn open_database_migrates_version_1() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("catalog.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE schema_version (version INTEGER NOT NULL,
                 applied_at TEXT NOT NULL DEFAULT (datetime('now')));
             INSERT INTO schema_version (version) VALUES (1);
             CREATE TABLE series (id INTEGER PRIMARY KEY AUTOINCREMENT,
                 title TEXT NOT NULL UNIQUE);
             INSERT INTO series (title) VALUES ('Discworld');",
        )
        .unwrap();
    }

    let conn = open_database(&path).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
    let complete: bool = conn
        .query_row("SELECT complete FROM series WHERE title = 'Discworld'", [], |r| r.get(0))
        .unwrap();
    assert!(!complete);
}

#[test]
fn open_database_rejects_newer_schema() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("catalog.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(&format!(
            "CREATE TABLE schema_version (version INTEGER NOT NULL,
                 applied_at TEXT NOT NULL DEFAULT (datetime('now')));
             INSERT INTO schema_version (version) VALUES ({});",
            CURRENT_VERSION + 1
        ))
        .unwrap();
    }

    assert!(open_database(&path).is_err());
}

#[test]
fn open_database_creates_and_reopens() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("catalog.db");
    drop(open_database(&path).unwrap());
    let conn = open_database(&path).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_VERSION);
}
