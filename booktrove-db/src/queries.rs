//! Read queries for the catalogue database.
//!
//! Provides book listing, export selection, search, and statistics.

use booktrove_catalog::{Author, Book, BookSeries, Bookshelf, Price, Style};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::ToSql;
use rusqlite::{Connection, Row, params};

use crate::operations::OperationError;

const BOOK_COLUMNS: &str = "b.id, b.uuid, b.title, b.isbn, b.price_amount, b.price_currency,
     b.language, b.format, b.date_published, b.description, b.date_added, b.last_updated";

// ── Book Queries ────────────────────────────────────────────────────────────

/// All books, ordered by title.
pub fn list_books(conn: &Connection) -> Result<Vec<Book>, OperationError> {
    load_books(conn, "1 = 1 ORDER BY b.title COLLATE NOCASE, b.id", &[])
}

/// Books to include in a backup, by row id. With `since`, only books
/// updated after that instant.
pub fn books_for_export(
    conn: &Connection,
    since: Option<&DateTime<Utc>>,
) -> Result<Vec<Book>, OperationError> {
    match since {
        Some(since) => {
            let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
            load_books(conn, "b.last_updated > ?1 ORDER BY b.id", &[&since as &dyn ToSql])
        }
        None => load_books(conn, "1 = 1 ORDER BY b.id", &[]),
    }
}

/// Number of books [`books_for_export`] would return.
pub fn count_books_for_export(
    conn: &Connection,
    since: Option<&DateTime<Utc>>,
) -> Result<usize, OperationError> {
    let count: i64 = match since {
        Some(since) => conn.query_row(
            "SELECT COUNT(*) FROM books WHERE last_updated > ?1",
            params![since.to_rfc3339_opts(SecondsFormat::Secs, true)],
            |r| r.get(0),
        )?,
        None => conn.query_row("SELECT COUNT(*) FROM books", [], |r| r.get(0))?,
    };
    Ok(count as usize)
}

/// Search books by title, ISBN, or author name (case-insensitive LIKE).
pub fn search_books(conn: &Connection, query: &str) -> Result<Vec<Book>, OperationError> {
    let pattern = format!("%{}%", query.trim());
    load_books(
        conn,
        "b.title LIKE ?1
            OR b.isbn LIKE ?1
            OR b.id IN (SELECT ba.book_id FROM book_authors ba
                        JOIN authors a ON a.id = ba.author_id
                        WHERE a.family_name LIKE ?1 OR a.given_names LIKE ?1)
         ORDER BY b.title COLLATE NOCASE, b.id LIMIT 100",
        &[&pattern as &dyn ToSql],
    )
}

pub(crate) fn load_book_where(
    conn: &Connection,
    clause: &str,
    param: &dyn ToSql,
) -> Result<Vec<Book>, OperationError> {
    load_books(conn, clause, &[param])
}

fn load_books(
    conn: &Connection,
    clause: &str,
    params: &[&dyn ToSql],
) -> Result<Vec<Book>, OperationError> {
    let sql = format!("SELECT {BOOK_COLUMNS} FROM books b WHERE {clause}");
    let mut stmt = conn.prepare(&sql)?;
    let mut books = stmt
        .query_map(params, row_to_book)?
        .collect::<Result<Vec<_>, _>>()?;
    for book in &mut books {
        load_book_links(conn, book)?;
    }
    Ok(books)
}

fn row_to_book(row: &Row) -> rusqlite::Result<Book> {
    let amount: Option<f64> = row.get(4)?;
    let currency: Option<String> = row.get(5)?;
    Ok(Book {
        id: row.get(0)?,
        uuid: row.get(1)?,
        title: row.get(2)?,
        isbn: row.get(3)?,
        price: amount.map(|amount| Price {
            amount,
            currency: currency.unwrap_or_default(),
        }),
        language: row.get(6)?,
        format: row.get(7)?,
        date_published: row.get(8)?,
        description: row.get(9)?,
        date_added: row.get(10)?,
        last_updated: row.get(11)?,
        ..Book::default()
    })
}

fn load_book_links(conn: &Connection, book: &mut Book) -> Result<(), OperationError> {
    let mut stmt = conn.prepare_cached(
        "SELECT a.family_name, a.given_names FROM book_authors ba
         JOIN authors a ON a.id = ba.author_id
         WHERE ba.book_id = ?1 ORDER BY ba.position",
    )?;
    book.authors = stmt
        .query_map([book.id], |row| {
            Ok(Author::new(
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        })?
        .collect::<Result<_, _>>()?;

    let mut stmt = conn.prepare_cached(
        "SELECT s.title, bs.number FROM book_series bs
         JOIN series s ON s.id = bs.series_id
         WHERE bs.book_id = ?1 ORDER BY bs.position",
    )?;
    book.series = stmt
        .query_map([book.id], |row| {
            Ok(BookSeries {
                title: row.get(0)?,
                number: row.get(1)?,
            })
        })?
        .collect::<Result<_, _>>()?;

    let mut stmt = conn.prepare_cached(
        "SELECT p.name FROM book_publishers bp
         JOIN publishers p ON p.id = bp.publisher_id
         WHERE bp.book_id = ?1 ORDER BY bp.position",
    )?;
    book.publishers = stmt
        .query_map([book.id], |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    let mut stmt = conn.prepare_cached(
        "SELECT s.name FROM book_bookshelves bb
         JOIN bookshelves s ON s.id = bb.bookshelf_id
         WHERE bb.book_id = ?1 ORDER BY s.name",
    )?;
    book.bookshelves = stmt
        .query_map([book.id], |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    let mut stmt = conn.prepare_cached(
        "SELECT file_name FROM covers WHERE book_id = ?1 ORDER BY position",
    )?;
    book.covers = stmt
        .query_map([book.id], |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    Ok(())
}

// ── Style / Bookshelf Queries ───────────────────────────────────────────────

/// All styles, builtin first, then by name.
pub fn list_styles(conn: &Connection) -> Result<Vec<Style>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT uuid, name, preferred, groups, sort, show_covers, builtin
         FROM styles ORDER BY builtin DESC, name COLLATE NOCASE",
    )?;
    let raw = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, bool>(5)?,
                row.get::<_, bool>(6)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut styles = Vec::with_capacity(raw.len());
    for (uuid, name, preferred, groups, sort, show_covers, builtin) in raw {
        styles.push(Style {
            uuid,
            name,
            preferred,
            groups: serde_json::from_str(&groups)?,
            sort: serde_json::from_str(&sort)?,
            show_covers,
            builtin,
        });
    }
    Ok(styles)
}

/// All bookshelves, by name.
pub fn list_bookshelves(conn: &Connection) -> Result<Vec<Bookshelf>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, style_uuid FROM bookshelves ORDER BY name COLLATE NOCASE",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Bookshelf {
            id: row.get(0)?,
            name: row.get(1)?,
            style_uuid: row.get(2)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Get overall catalogue statistics.
pub fn catalog_stats(conn: &Connection) -> Result<CatalogStats, OperationError> {
    let count = |sql: &str| -> Result<i64, OperationError> {
        Ok(conn.query_row(sql, [], |r| r.get(0))?)
    };

    Ok(CatalogStats {
        books: count("SELECT COUNT(*) FROM books")?,
        authors: count("SELECT COUNT(*) FROM authors")?,
        series: count("SELECT COUNT(*) FROM series")?,
        publishers: count("SELECT COUNT(*) FROM publishers")?,
        bookshelves: count("SELECT COUNT(*) FROM bookshelves")?,
        covers: count("SELECT COUNT(*) FROM covers")?,
        styles: count("SELECT COUNT(*) FROM styles")?,
        last_updated: conn.query_row("SELECT MAX(last_updated) FROM books", [], |r| r.get(0))?,
    })
}

/// Summary statistics for the catalogue.
#[derive(Debug)]
pub struct CatalogStats {
    pub books: i64,
    pub authors: i64,
    pub series: i64,
    pub publishers: i64,
    pub bookshelves: i64,
    pub covers: i64,
    pub styles: i64,
    pub last_updated: Option<String>,
}
