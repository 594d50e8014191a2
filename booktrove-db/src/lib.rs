//! SQLite persistence layer for the book catalogue.
//!
//! Provides schema creation, CRUD operations, and query APIs
//! backed by SQLite (via rusqlite with bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{
    OperationError, book_id_by_uuid, canonical_timestamp, delete_book, delete_style,
    find_book_by_id, find_book_by_uuid, insert_book, now_utc, set_series_complete, update_book,
    upsert_author, upsert_bookshelf, upsert_publisher, upsert_series, upsert_style,
};
pub use queries::{
    CatalogStats, books_for_export, catalog_stats, count_books_for_export, list_books,
    list_bookshelves, list_styles, search_books,
};
pub use schema::{SchemaError, open_database, open_memory};
