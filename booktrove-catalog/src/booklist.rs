//! Booklist construction: flatten a set of books into grouped rows
//! according to a [`Style`].

use std::collections::HashMap;

use crate::types::{Book, BookSort, BooklistGroup, Style};

/// Label for books with no value at a grouping level. Always sorted last.
pub const UNKNOWN_LABEL: &str = "(unknown)";

/// One line of a booklist: either a group header or a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooklistRow {
    /// Nesting depth. Headers of the first group are level 0; books sit at
    /// `style.groups.len()`.
    pub level: usize,
    pub label: String,
    /// Set for book rows, `None` for headers.
    pub book_id: Option<i64>,
}

impl BooklistRow {
    pub fn is_header(&self) -> bool {
        self.book_id.is_none()
    }
}

/// Group and sort `books` into display rows.
///
/// Multi-valued keys (authors, publishers, bookshelves, series) list a book
/// under each of its values.
pub fn build_booklist(books: &[Book], style: &Style) -> Vec<BooklistRow> {
    let mut rows = Vec::new();
    let refs: Vec<&Book> = books.iter().collect();
    build_level(refs, &style.groups, 0, style.sort, &mut rows);
    rows
}

fn build_level(
    mut books: Vec<&Book>,
    groups: &[BooklistGroup],
    level: usize,
    sort: BookSort,
    rows: &mut Vec<BooklistRow>,
) {
    let Some((group, rest)) = groups.split_first() else {
        sort_books(&mut books, sort);
        rows.extend(books.into_iter().map(|book| BooklistRow {
            level,
            label: book.title.clone(),
            book_id: Some(book.id),
        }));
        return;
    };

    // Keyed by lowercase label; the first spelling seen is displayed.
    let mut buckets: HashMap<String, (String, Vec<&Book>)> = HashMap::new();
    for book in books {
        for key in group_keys(book, *group) {
            buckets
                .entry(key.to_lowercase())
                .or_insert_with(|| (key.clone(), Vec::new()))
                .1
                .push(book);
        }
    }

    let mut keys: Vec<String> = buckets.keys().cloned().collect();
    keys.sort_by(|a, b| (a == UNKNOWN_LABEL, a).cmp(&(b == UNKNOWN_LABEL, b)));

    for key in keys {
        let Some((label, members)) = buckets.remove(&key) else {
            continue;
        };
        rows.push(BooklistRow {
            level,
            label,
            book_id: None,
        });
        build_level(members, rest, level + 1, sort, rows);
    }
}

fn group_keys(book: &Book, group: BooklistGroup) -> Vec<String> {
    let mut keys: Vec<String> = match group {
        BooklistGroup::Author => book.authors.iter().map(|a| a.sort_name()).collect(),
        BooklistGroup::Series => book.series.iter().map(|s| s.title.clone()).collect(),
        BooklistGroup::Publisher => book.publishers.clone(),
        BooklistGroup::Bookshelf => book.bookshelves.clone(),
        BooklistGroup::Language => book.language.iter().cloned().collect(),
        BooklistGroup::Format => book.format.iter().cloned().collect(),
        BooklistGroup::YearPublished => book
            .year_published()
            .map(|y| y.to_string())
            .into_iter()
            .collect(),
    };
    keys.retain(|k| !k.trim().is_empty());
    keys.sort_by_key(|k| k.to_lowercase());
    keys.dedup_by_key(|k| k.to_lowercase());
    if keys.is_empty() {
        keys.push(UNKNOWN_LABEL.to_string());
    }
    keys
}

fn sort_books(books: &mut [&Book], sort: BookSort) {
    match sort {
        BookSort::TitleAsc => {
            books.sort_by_key(|b| (b.title.to_lowercase(), b.id));
        }
        BookSort::TitleDesc => {
            books.sort_by_key(|b| (b.title.to_lowercase(), b.id));
            books.reverse();
        }
        // Newest first.
        BookSort::DateAdded => {
            books.sort_by(|a, b| b.date_added.cmp(&a.date_added).then(a.id.cmp(&b.id)));
        }
        // Undated books last.
        BookSort::DatePublished => {
            books.sort_by_key(|b| {
                (
                    b.date_published.is_none(),
                    b.date_published.clone(),
                    b.title.to_lowercase(),
                )
            });
        }
    }
}
