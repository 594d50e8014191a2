//! Open Library engine.
//!
//! ISBN lookups use the `/api/books?jscmd=data` endpoint, which returns
//! author and publisher names inline. Free searches go through
//! `/search.json`. No API key is needed.

use std::collections::HashMap;

use futures::future::BoxFuture;
use serde::Deserialize;
use tokio::time::Duration;

use crate::client::SiteClient;
use crate::engine::{EngineId, SearchEngine};
use crate::error::SearchError;
use crate::types::{BookCandidate, CoverSize, SearchQuery, normalize_date};

const BASE_URL: &str = "https://openlibrary.org";
const COVERS_URL: &str = "https://covers.openlibrary.org/b";
const MIN_INTERVAL: Duration = Duration::from_millis(500);
const SEARCH_LIMIT: usize = 10;

// ── Response types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct Identifiers {
    #[serde(default)]
    isbn_13: Vec<String>,
    #[serde(default)]
    isbn_10: Vec<String>,
    #[serde(default)]
    openlibrary: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Covers {
    small: Option<String>,
    medium: Option<String>,
    large: Option<String>,
}

/// `notes` is either a plain string or `{"type": ..., "value": ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Notes {
    Text(String),
    Typed { value: String },
}

#[derive(Debug, Deserialize)]
struct Edition {
    title: Option<String>,
    subtitle: Option<String>,
    #[serde(default)]
    authors: Vec<Named>,
    #[serde(default)]
    publishers: Vec<Named>,
    publish_date: Option<String>,
    #[serde(default)]
    identifiers: Identifiers,
    cover: Option<Covers>,
    number_of_pages: Option<u32>,
    notes: Option<Notes>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    key: Option<String>,
    title: Option<String>,
    #[serde(default)]
    author_name: Vec<String>,
    #[serde(default)]
    isbn: Vec<String>,
    #[serde(default)]
    publisher: Vec<String>,
    first_publish_year: Option<i32>,
    cover_i: Option<i64>,
    #[serde(default)]
    language: Vec<String>,
    number_of_pages_median: Option<u32>,
}

// ── Parsing ─────────────────────────────────────────────────────────────

/// Parse an `/api/books?jscmd=data` response. The body maps each requested
/// bibkey to an edition; an unknown ISBN gives an empty object.
pub fn parse_books_response(body: &str, isbn: &str) -> Result<Vec<BookCandidate>, SearchError> {
    let editions: HashMap<String, Edition> =
        serde_json::from_str(body).map_err(|e| SearchError::Parse(e.to_string()))?;
    Ok(editions_to_candidates(editions, isbn))
}

fn editions_to_candidates(editions: HashMap<String, Edition>, isbn: &str) -> Vec<BookCandidate> {
    editions
        .into_values()
        .map(|e| edition_to_candidate(e, isbn))
        .collect()
}

fn edition_to_candidate(e: Edition, isbn: &str) -> BookCandidate {
    let mut c = BookCandidate::new(EngineId::OpenLibrary);
    c.title = match (e.title, e.subtitle) {
        (Some(t), Some(s)) if !s.is_empty() => Some(format!("{t}: {s}")),
        (t, _) => t,
    };
    c.authors = e.authors.into_iter().map(|a| a.name).collect();
    c.publishers = e.publishers.into_iter().map(|p| p.name).collect();
    c.date_published = e.publish_date.as_deref().and_then(normalize_date);
    c.isbn = e
        .identifiers
        .isbn_13
        .into_iter()
        .next()
        .or_else(|| e.identifiers.isbn_10.into_iter().next())
        .or_else(|| Some(isbn.to_string()));
    c.external_id = e.identifiers.openlibrary.into_iter().next();
    c.page_count = e.number_of_pages;
    c.description = e.notes.map(|n| match n {
        Notes::Text(s) | Notes::Typed { value: s } => s,
    });
    if let Some(cover) = e.cover {
        c.cover_urls = [cover.large, cover.medium, cover.small]
            .into_iter()
            .flatten()
            .take(1)
            .collect();
    }
    c
}

/// Parse a `/search.json` response.
pub fn parse_search_response(body: &str) -> Result<Vec<BookCandidate>, SearchError> {
    let resp: SearchResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Parse(e.to_string()))?;
    Ok(search_to_candidates(resp))
}

fn search_to_candidates(resp: SearchResponse) -> Vec<BookCandidate> {
    resp.docs
        .into_iter()
        .take(SEARCH_LIMIT)
        .map(|doc| {
            let mut c = BookCandidate::new(EngineId::OpenLibrary);
            c.external_id = doc.key;
            c.title = doc.title;
            c.authors = doc.author_name;
            c.isbn = doc
                .isbn
                .iter()
                .find(|i| i.len() == 13)
                .or_else(|| doc.isbn.first())
                .cloned();
            c.publishers = doc.publisher.into_iter().take(1).collect();
            c.date_published = doc.first_publish_year.map(|y| y.to_string());
            c.language = doc.language.into_iter().next();
            c.page_count = doc.number_of_pages_median;
            c.cover_urls = doc
                .cover_i
                .map(|id| format!("{COVERS_URL}/id/{id}-L.jpg"))
                .into_iter()
                .collect();
            c
        })
        .collect()
}

// ── Engine ──────────────────────────────────────────────────────────────

pub struct OpenLibraryEngine {
    client: SiteClient,
}

impl OpenLibraryEngine {
    pub fn new() -> Result<Self, SearchError> {
        Ok(Self {
            client: SiteClient::new(MIN_INTERVAL)?,
        })
    }

    async fn lookup_isbn(&self, isbn: &str) -> Result<Vec<BookCandidate>, SearchError> {
        let editions: HashMap<String, Edition> = self
            .client
            .get_json(
                &format!("{BASE_URL}/api/books"),
                &[
                    ("bibkeys", format!("ISBN:{isbn}")),
                    ("jscmd", "data".into()),
                    ("format", "json".into()),
                ],
            )
            .await?;
        let found = editions_to_candidates(editions, isbn);
        log::debug!("Open Library: {} result(s) for {isbn}", found.len());
        Ok(found)
    }

    async fn free_search(&self, query: &SearchQuery) -> Result<Vec<BookCandidate>, SearchError> {
        let mut params = vec![("limit", SEARCH_LIMIT.to_string())];
        if let Some(title) = query.title.as_deref().filter(|s| !s.trim().is_empty()) {
            params.push(("title", title.trim().to_string()));
        }
        if let Some(author) = query.author.as_deref().filter(|s| !s.trim().is_empty()) {
            params.push(("author", author.trim().to_string()));
        }
        let resp: SearchResponse = self
            .client
            .get_json(&format!("{BASE_URL}/search.json"), &params)
            .await?;
        Ok(search_to_candidates(resp))
    }
}

impl SearchEngine for OpenLibraryEngine {
    fn id(&self) -> EngineId {
        EngineId::OpenLibrary
    }

    fn search_by_isbn<'a>(
        &'a self,
        isbn: &'a str,
    ) -> BoxFuture<'a, Result<Vec<BookCandidate>, SearchError>> {
        Box::pin(self.lookup_isbn(isbn))
    }

    fn search<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> BoxFuture<'a, Result<Vec<BookCandidate>, SearchError>> {
        Box::pin(async move {
            match query.isbn.as_deref() {
                Some(isbn) if !isbn.trim().is_empty() => self.lookup_isbn(isbn.trim()).await,
                _ => self.free_search(query).await,
            }
        })
    }

    fn cover_url(&self, isbn: &str, size: CoverSize) -> Option<String> {
        Some(cover_url(isbn, size))
    }
}

/// `default=false` makes the cover host answer 404 instead of a blank image.
pub fn cover_url(isbn: &str, size: CoverSize) -> String {
    let size = match size {
        CoverSize::Small => "S",
        CoverSize::Medium => "M",
        CoverSize::Large => "L",
    };
    format!("{COVERS_URL}/isbn/{isbn}-{size}.jpg?default=false")
}

#[cfg(test)]
#[path = "tests/openlibrary_tests.rs"]
mod tests;
