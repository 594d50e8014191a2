use booktrove_catalog::{Author, Book, Isbn};
use serde::Serialize;

use crate::engine::EngineId;

/// What to look for. An ISBN search ignores title and author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
}

impl SearchQuery {
    pub fn isbn(isbn: impl Into<String>) -> Self {
        Self {
            isbn: Some(isbn.into()),
            ..Self::default()
        }
    }

    pub fn text(title: Option<String>, author: Option<String>) -> Self {
        Self {
            isbn: None,
            title,
            author,
        }
    }

    pub fn is_empty(&self) -> bool {
        let blank = |s: &Option<String>| s.as_deref().is_none_or(|s| s.trim().is_empty());
        blank(&self.isbn) && blank(&self.title) && blank(&self.author)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverSize {
    Small,
    #[default]
    Medium,
    Large,
}

/// One book as described by one site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookCandidate {
    pub source: EngineId,
    /// The site's own id for the book, if it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub isbn: Option<String>,
    pub publishers: Vec<String>,
    pub date_published: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub page_count: Option<u32>,
    pub cover_urls: Vec<String>,
}

impl BookCandidate {
    pub fn new(source: EngineId) -> Self {
        Self {
            source,
            external_id: None,
            title: None,
            authors: Vec::new(),
            isbn: None,
            publishers: Vec::new(),
            date_published: None,
            language: None,
            description: None,
            page_count: None,
            cover_urls: Vec::new(),
        }
    }

    /// Whether the candidate's ISBN (if any) is the same book as `isbn`,
    /// comparing ISBN-10 and ISBN-13 forms.
    pub fn matches_isbn(&self, isbn: &str) -> bool {
        let Some(own) = self.isbn.as_deref() else {
            return true;
        };
        match (Isbn::parse(own), Isbn::parse(isbn)) {
            (Ok(a), Ok(b)) => a.to_isbn13() == b.to_isbn13(),
            _ => own.eq_ignore_ascii_case(isbn),
        }
    }

    /// Convert to a catalogue book. Returns `None` without a title.
    pub fn into_book(self) -> Option<Book> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        let mut book = Book::new(title);
        book.authors = self.authors.iter().map(|a| Author::parse(a)).collect();
        book.isbn = self.isbn;
        book.publishers = self.publishers;
        book.date_published = self.date_published;
        book.language = self.language;
        book.description = self.description;
        Some(book)
    }
}

/// Reduce a site's free-form date to `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
///
/// ISO-style prefixes are kept; otherwise the first four-digit year found
/// is used ("March 2009" gives "2009").
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let iso = |s: &str| {
        let b = s.as_bytes();
        let digits = |r: std::ops::Range<usize>| r.into_iter().all(|i| b[i].is_ascii_digit());
        match b.len() {
            4 => digits(0..4),
            7 => digits(0..4) && b[4] == b'-' && digits(5..7),
            10 => digits(0..4) && b[4] == b'-' && digits(5..7) && b[7] == b'-' && digits(8..10),
            _ => false,
        }
    };
    for len in [10, 7, 4] {
        if let Some(prefix) = raw.get(..len) {
            if iso(prefix) && (raw.len() == len || !raw.as_bytes()[len].is_ascii_digit()) {
                return Some(prefix.to_string());
            }
        }
    }

    let bytes = raw.as_bytes();
    (0..bytes.len().saturating_sub(3))
        .find(|&i| {
            bytes[i..i + 4].iter().all(u8::is_ascii_digit)
                && (i == 0 || !bytes[i - 1].is_ascii_digit())
                && bytes.get(i + 4).is_none_or(|b| !b.is_ascii_digit())
        })
        .map(|i| raw[i..i + 4].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates() {
        assert_eq!(normalize_date("2009-03-01").as_deref(), Some("2009-03-01"));
        assert_eq!(normalize_date("2009-03").as_deref(), Some("2009-03"));
        assert_eq!(normalize_date("1985").as_deref(), Some("1985"));
        assert_eq!(normalize_date("March 2009").as_deref(), Some("2009"));
        assert_eq!(normalize_date("2004-05-01T00:00:00Z").as_deref(), Some("2004-05-01"));
        assert_eq!(normalize_date("c. 1887, reprinted").as_deref(), Some("1887"));
        assert_eq!(normalize_date("12345"), None);
        assert_eq!(normalize_date("unknown"), None);
    }

    #[test]
    fn isbn_matching_crosses_forms() {
        let mut c = BookCandidate::new(EngineId::OpenLibrary);
        assert!(c.matches_isbn("9780575041158"));
        c.isbn = Some("0575041153".into());
        assert!(c.matches_isbn("9780575041158"));
        assert!(!c.matches_isbn("9780441172719"));
    }

    #[test]
    fn candidate_to_book() {
        let mut c = BookCandidate::new(EngineId::GoogleBooks);
        assert!(c.clone().into_book().is_none());
        c.title = Some("Dune".into());
        c.authors = vec!["Frank Herbert".into()];
        c.date_published = Some("1965".into());
        let book = c.into_book().unwrap();
        assert_eq!(book.authors[0].family_name, "Herbert");
        assert_eq!(book.year_published(), Some(1965));
    }

    #[test]
    fn empty_query() {
        assert!(SearchQuery::default().is_empty());
        assert!(SearchQuery::text(Some("  ".into()), None).is_empty());
        assert!(!SearchQuery::isbn("123").is_empty());
    }
}
