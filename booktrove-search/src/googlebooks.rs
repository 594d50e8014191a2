//! Google Books engine.
//!
//! Works without a key at a low anonymous quota; a key from
//! [`Credentials`](crate::credentials::Credentials) is sent when set.

use futures::future::BoxFuture;
use serde::Deserialize;
use tokio::time::Duration;

use crate::client::SiteClient;
use crate::engine::{EngineId, SearchEngine};
use crate::error::SearchError;
use crate::types::{BookCandidate, SearchQuery, normalize_date};

const VOLUMES_URL: &str = "https://www.googleapis.com/books/v1/volumes";
const MIN_INTERVAL: Duration = Duration::from_millis(250);
const MAX_RESULTS: usize = 10;

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    id: Option<String>,
    volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    subtitle: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    publisher: Option<String>,
    published_date: Option<String>,
    description: Option<String>,
    #[serde(default)]
    industry_identifiers: Vec<IndustryIdentifier>,
    page_count: Option<u32>,
    language: Option<String>,
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: String,
    identifier: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    small_thumbnail: Option<String>,
    thumbnail: Option<String>,
}

/// Parse a `volumes` response.
pub fn parse_volumes(body: &str) -> Result<Vec<BookCandidate>, SearchError> {
    let resp: VolumesResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Parse(e.to_string()))?;
    Ok(volumes_to_candidates(resp))
}

fn volumes_to_candidates(resp: VolumesResponse) -> Vec<BookCandidate> {
    resp.items
        .into_iter()
        .take(MAX_RESULTS)
        .filter_map(|v| {
            let info = v.volume_info?;
            let mut c = BookCandidate::new(EngineId::GoogleBooks);
            c.external_id = v.id;
            c.title = match (info.title, info.subtitle) {
                (Some(t), Some(s)) if !s.is_empty() => Some(format!("{t}: {s}")),
                (t, _) => t,
            };
            c.authors = info.authors;
            c.publishers = info.publisher.into_iter().collect();
            c.date_published = info.published_date.as_deref().and_then(normalize_date);
            c.description = info.description;
            c.page_count = info.page_count.filter(|&n| n > 0);
            c.language = info.language;
            c.isbn = pick_isbn(&info.industry_identifiers);
            c.cover_urls = info
                .image_links
                .and_then(|l| l.thumbnail.or(l.small_thumbnail))
                .map(|url| url.replacen("http://", "https://", 1))
                .into_iter()
                .collect();
            Some(c)
        })
        .collect()
}

/// Prefer ISBN-13 over ISBN-10; other identifier kinds are ignored.
fn pick_isbn(ids: &[IndustryIdentifier]) -> Option<String> {
    ["ISBN_13", "ISBN_10"].iter().find_map(|kind| {
        ids.iter()
            .find(|i| i.kind == *kind)
            .map(|i| i.identifier.clone())
    })
}

/// Build the `q` parameter: `isbn:` alone, or `intitle:`/`inauthor:` terms.
pub fn build_query(query: &SearchQuery) -> Option<String> {
    let clean = |s: &Option<String>| {
        s.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    if let Some(isbn) = clean(&query.isbn) {
        return Some(format!("isbn:{isbn}"));
    }
    let terms: Vec<String> = [
        clean(&query.title).map(|t| format!("intitle:{t}")),
        clean(&query.author).map(|a| format!("inauthor:{a}")),
    ]
    .into_iter()
    .flatten()
    .collect();
    (!terms.is_empty()).then(|| terms.join("+"))
}

pub struct GoogleBooksEngine {
    client: SiteClient,
    api_key: Option<String>,
}

impl GoogleBooksEngine {
    pub fn new(api_key: Option<String>) -> Result<Self, SearchError> {
        Ok(Self {
            client: SiteClient::new(MIN_INTERVAL)?,
            api_key,
        })
    }

    async fn volumes(&self, query: &SearchQuery) -> Result<Vec<BookCandidate>, SearchError> {
        let q = build_query(query)
            .ok_or_else(|| SearchError::Query("nothing to search for".into()))?;
        let mut params = vec![("q", q), ("maxResults", MAX_RESULTS.to_string())];
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }
        let resp: VolumesResponse = self.client.get_json(VOLUMES_URL, &params).await?;
        let found = volumes_to_candidates(resp);
        log::debug!("Google Books: {} result(s)", found.len());
        Ok(found)
    }
}

impl SearchEngine for GoogleBooksEngine {
    fn id(&self) -> EngineId {
        EngineId::GoogleBooks
    }

    fn search_by_isbn<'a>(
        &'a self,
        isbn: &'a str,
    ) -> BoxFuture<'a, Result<Vec<BookCandidate>, SearchError>> {
        Box::pin(async move { self.volumes(&SearchQuery::isbn(isbn)).await })
    }

    fn search<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> BoxFuture<'a, Result<Vec<BookCandidate>, SearchError>> {
        Box::pin(self.volumes(query))
    }
}

#[cfg(test)]
#[path = "tests/googlebooks_tests.rs"]
mod tests;
