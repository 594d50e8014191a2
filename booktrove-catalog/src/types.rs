//! Data model types for the book catalogue.
//!
//! These types represent the persistent catalogue schema: books, authors,
//! series, bookshelves, and booklist styles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Author ──────────────────────────────────────────────────────────────────

/// A book author. Identity is the (family name, given names) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Author {
    pub family_name: String,
    #[serde(default)]
    pub given_names: String,
}

impl Author {
    pub fn new(family_name: impl Into<String>, given_names: impl Into<String>) -> Self {
        Self {
            family_name: family_name.into(),
            given_names: given_names.into(),
        }
    }

    /// Parse a free-form author name.
    ///
    /// Accepts "Family, Given" and "Given Family" (last word is the family name).
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if let Some((family, given)) = name.split_once(',') {
            return Self::new(family.trim(), given.trim());
        }
        match name.rsplit_once(' ') {
            Some((given, family)) => Self::new(family.trim(), given.trim()),
            None => Self::new(name, ""),
        }
    }

    /// "Given Family", as shown in lists.
    pub fn display_name(&self) -> String {
        if self.given_names.is_empty() {
            self.family_name.clone()
        } else {
            format!("{} {}", self.given_names, self.family_name)
        }
    }

    /// "Family, Given", used for grouping and sorting.
    pub fn sort_name(&self) -> String {
        if self.given_names.is_empty() {
            self.family_name.clone()
        } else {
            format!("{}, {}", self.family_name, self.given_names)
        }
    }
}

// ── Series ──────────────────────────────────────────────────────────────────

/// A book's membership in a series, with its optional number in that series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSeries {
    pub title: String,
    #[serde(default)]
    pub number: Option<String>,
}

impl BookSeries {
    pub fn new(title: impl Into<String>, number: Option<&str>) -> Self {
        Self {
            title: title.into(),
            number: number.map(str::to_string),
        }
    }

    pub fn label(&self) -> String {
        match &self.number {
            Some(n) if !n.is_empty() => format!("{} #{}", self.title, n),
            _ => self.title.clone(),
        }
    }
}

/// A series as stored in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub complete: bool,
}

// ── Price ───────────────────────────────────────────────────────────────────

/// A list price: amount plus ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    pub currency: String,
}

impl Price {
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into().to_uppercase(),
        }
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} {}", self.amount, self.currency)
    }
}

// ── Book ────────────────────────────────────────────────────────────────────

/// A catalogued book.
///
/// `id` is the local row id and is meaningless outside the catalogue it came
/// from; `uuid` is the stable identity used to match books across backups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub uuid: String,
    pub title: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub series: Vec<BookSeries>,
    #[serde(default)]
    pub publishers: Vec<String>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    /// Partial date: `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
    #[serde(default)]
    pub date_published: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Cover image file names, position 0 is the front cover.
    #[serde(default)]
    pub covers: Vec<String>,
    #[serde(default)]
    pub bookshelves: Vec<String>,
    #[serde(default)]
    pub date_added: String,
    #[serde(default)]
    pub last_updated: String,
}

impl Book {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: Author) -> Self {
        self.authors.push(author);
        self
    }

    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    pub fn with_series(mut self, series: BookSeries) -> Self {
        self.series.push(series);
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publishers.push(publisher.into());
        self
    }

    pub fn primary_author(&self) -> Option<&Author> {
        self.authors.first()
    }

    /// The year part of `date_published`, if it parses.
    pub fn year_published(&self) -> Option<i32> {
        self.date_published
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok())
    }

    /// `last_updated` as a UTC timestamp, if set and valid.
    pub fn last_updated_utc(&self) -> Option<DateTime<Utc>> {
        parse_utc(&self.last_updated)
    }
}

/// Parse an RFC 3339 timestamp (or SQLite `datetime('now')` format) as UTC.
pub fn parse_utc(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

// ── Covers ──────────────────────────────────────────────────────────────────

/// File name for a cover image: `<uuid>.<ext>` for the front cover,
/// `<uuid>_<position>.<ext>` for any other position.
pub fn cover_file_name(uuid: &str, position: usize, ext: &str) -> String {
    if position == 0 {
        format!("{uuid}.{ext}")
    } else {
        format!("{uuid}_{position}.{ext}")
    }
}

/// Inverse of [`cover_file_name`]: the book uuid and cover position.
pub fn parse_cover_file_name(name: &str) -> Option<(String, usize)> {
    let (stem, ext) = name.rsplit_once('.')?;
    if !is_cover_extension(ext) {
        return None;
    }
    match stem.rsplit_once('_') {
        Some((uuid, pos)) if !uuid.is_empty() => {
            let position = pos.parse().ok()?;
            Some((uuid.to_string(), position))
        }
        _ => Some((stem.to_string(), 0)),
    }
}

/// Whether a file extension is one we store covers as.
pub fn is_cover_extension(ext: &str) -> bool {
    matches!(
        ext.to_ascii_lowercase().as_str(),
        "jpg" | "jpeg" | "png" | "webp"
    )
}

// ── Bookshelf ───────────────────────────────────────────────────────────────

/// A user-defined shelf. Books may sit on any number of shelves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookshelf {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    /// Style used when this shelf is displayed, if not the preferred one.
    #[serde(default)]
    pub style_uuid: Option<String>,
}

// ── Style ───────────────────────────────────────────────────────────────────

/// A grouping level in a booklist style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooklistGroup {
    Author,
    Series,
    Publisher,
    Bookshelf,
    Language,
    Format,
    YearPublished,
}

impl BooklistGroup {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Author => "Author",
            Self::Series => "Series",
            Self::Publisher => "Publisher",
            Self::Bookshelf => "Bookshelf",
            Self::Language => "Language",
            Self::Format => "Format",
            Self::YearPublished => "Year published",
        }
    }
}

/// Ordering of books within the innermost group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookSort {
    #[default]
    TitleAsc,
    TitleDesc,
    DateAdded,
    DatePublished,
}

/// A grouping/sorting/display definition for the booklist view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub preferred: bool,
    #[serde(default)]
    pub groups: Vec<BooklistGroup>,
    #[serde(default)]
    pub sort: BookSort,
    #[serde(default = "default_true")]
    pub show_covers: bool,
    /// Builtin styles cannot be deleted or renamed.
    #[serde(default, skip_serializing)]
    pub builtin: bool,
}

fn default_true() -> bool {
    true
}

const STYLE_AUTHOR_SERIES: &str = "6a82c4c0-48f1-4130-8a62-bbf478ffe184";
const STYLE_SERIES: &str = "0ca3f2b4-ba76-4c9b-a5a9-4e6f41f5e9d6";
const STYLE_PUBLISHER: &str = "6f5ff9d4-8c1a-4b05-a1a3-86e3e1d9b0a2";
const STYLE_COMPACT: &str = "5e4c3b1d-1d53-4f4d-9f0f-0d3c4f1a9e77";

/// The styles every catalogue starts with.
pub fn builtin_styles() -> Vec<Style> {
    let style = |uuid: &str, name: &str, groups: Vec<BooklistGroup>, show_covers: bool| Style {
        uuid: uuid.to_string(),
        name: name.to_string(),
        preferred: true,
        groups,
        sort: BookSort::TitleAsc,
        show_covers,
        builtin: true,
    };
    vec![
        style(
            STYLE_AUTHOR_SERIES,
            "Author, Series",
            vec![BooklistGroup::Author, BooklistGroup::Series],
            true,
        ),
        style(STYLE_SERIES, "Series", vec![BooklistGroup::Series], true),
        style(STYLE_PUBLISHER, "Publisher", vec![BooklistGroup::Publisher], true),
        style(STYLE_COMPACT, "Compact", vec![BooklistGroup::Author], false),
    ]
}

/// The style used when nothing else is configured.
pub fn default_style() -> Style {
    builtin_styles().remove(0)
}
