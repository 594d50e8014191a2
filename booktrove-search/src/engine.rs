//! Search engine identifiers and the engine trait.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::credentials::Credentials;
use crate::error::SearchError;
use crate::googlebooks::GoogleBooksEngine;
use crate::openlibrary::OpenLibraryEngine;
use crate::types::{BookCandidate, CoverSize, SearchQuery};

/// Every search site we know of. The numeric value is persisted in
/// preference strings and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[repr(u32)]
pub enum EngineId {
    GoogleBooks = 1,
    Amazon = 1 << 1,
    /// Retired; never registered in a site list.
    LibraryThing = 1 << 2,
    Goodreads = 1 << 3,
    Isfdb = 1 << 4,
    OpenLibrary = 1 << 5,
    KbNl = 1 << 6,
    StripInfo = 1 << 7,
    LastDodo = 1 << 8,
}

impl EngineId {
    pub const ALL: [EngineId; 9] = [
        EngineId::GoogleBooks,
        EngineId::Amazon,
        EngineId::LibraryThing,
        EngineId::Goodreads,
        EngineId::Isfdb,
        EngineId::OpenLibrary,
        EngineId::KbNl,
        EngineId::StripInfo,
        EngineId::LastDodo,
    ];

    /// Order in which data from several sites is trusted, most reliable
    /// first.
    pub const DATA_RELIABILITY_ORDER: [EngineId; 8] = [
        EngineId::Isfdb,
        EngineId::StripInfo,
        EngineId::LastDodo,
        EngineId::Goodreads,
        EngineId::Amazon,
        EngineId::GoogleBooks,
        EngineId::KbNl,
        EngineId::OpenLibrary,
    ];

    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.id() == id)
    }

    /// Stable key used in preference names.
    pub fn key(self) -> &'static str {
        match self {
            Self::GoogleBooks => "googlebooks",
            Self::Amazon => "amazon",
            Self::LibraryThing => "librarything",
            Self::Goodreads => "goodreads",
            Self::Isfdb => "isfdb",
            Self::OpenLibrary => "openlibrary",
            Self::KbNl => "kbnl",
            Self::StripInfo => "stripinfo",
            Self::LastDodo => "lastdodo",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.key().eq_ignore_ascii_case(key))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::GoogleBooks => "Google Books",
            Self::Amazon => "Amazon",
            Self::LibraryThing => "LibraryThing",
            Self::Goodreads => "Goodreads",
            Self::Isfdb => "ISFDB",
            Self::OpenLibrary => "Open Library",
            Self::KbNl => "KB (Netherlands)",
            Self::StripInfo => "StripInfo",
            Self::LastDodo => "LastDodo",
        }
    }

    pub fn site_url(self) -> &'static str {
        match self {
            Self::GoogleBooks => "https://books.google.com",
            Self::Amazon => "https://www.amazon.com",
            Self::LibraryThing => "https://www.librarything.com",
            Self::Goodreads => "https://www.goodreads.com",
            Self::Isfdb => "https://www.isfdb.org",
            Self::OpenLibrary => "https://openlibrary.org",
            Self::KbNl => "https://www.kb.nl",
            Self::StripInfo => "https://www.stripinfo.be",
            Self::LastDodo => "https://www.lastdodo.nl",
        }
    }

    pub fn is_retired(self) -> bool {
        matches!(self, Self::LibraryThing)
    }

    /// Whether [`create_engine`] can build an engine for this site.
    pub fn has_engine(self) -> bool {
        matches!(self, Self::OpenLibrary | Self::GoogleBooks)
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the numeric id or the preference key.
impl FromStr for EngineId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let found = match s.parse::<u32>() {
            Ok(id) => Self::from_id(id),
            Err(_) => Self::from_key(s),
        };
        found.ok_or_else(|| format!("unknown search site '{s}'"))
    }
}

/// A site that can look books up.
///
/// Methods return boxed futures so engines can be used as trait objects.
pub trait SearchEngine: Send + Sync {
    fn id(&self) -> EngineId;

    fn name(&self) -> &'static str {
        self.id().name()
    }

    fn search_by_isbn<'a>(
        &'a self,
        isbn: &'a str,
    ) -> BoxFuture<'a, Result<Vec<BookCandidate>, SearchError>>;

    /// Free search on title and/or author.
    fn search<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> BoxFuture<'a, Result<Vec<BookCandidate>, SearchError>>;

    /// Direct cover image URL for an ISBN, if the site has one.
    fn cover_url(&self, _isbn: &str, _size: CoverSize) -> Option<String> {
        None
    }
}

/// Build the engine for `id`. Sites without an implementation give `None`.
pub fn create_engine(
    id: EngineId,
    creds: &Credentials,
) -> Result<Option<Arc<dyn SearchEngine>>, SearchError> {
    let engine: Arc<dyn SearchEngine> = match id {
        EngineId::OpenLibrary => Arc::new(OpenLibraryEngine::new()?),
        EngineId::GoogleBooks => Arc::new(GoogleBooksEngine::new(creds.google_books_key.clone())?),
        _ => return Ok(None),
    };
    Ok(Some(engine))
}
