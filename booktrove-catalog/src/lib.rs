//! Book catalogue data model types, ISBN helpers, YAML style loading, and
//! booklist grouping.
//!
//! This crate defines the persistent data model for the catalogue without
//! any database dependencies. Consumers can use these types directly for
//! serialization, display, or passing to `booktrove-db` for persistence.

pub mod booklist;
pub mod isbn;
pub mod types;
pub mod yaml;

pub use booklist::{BooklistRow, build_booklist};
pub use isbn::{Isbn, IsbnError, normalize_isbn};
pub use types::*;
pub use yaml::{YamlError, load_styles};
