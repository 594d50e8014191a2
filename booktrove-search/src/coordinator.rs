//! Runs one search against several sites at once.
//!
//! Every engine is queried concurrently on a [`WorkerPool`]. For an ISBN
//! search the answers are merged in data reliability order with a
//! [`ResultsAccumulator`]; a title/author search returns each site's list
//! unmerged, since different sites may well be describing different books.

use std::sync::Arc;

use booktrove_catalog::normalize_isbn;
use booktrove_lib::WorkerPool;
use tokio::time::Duration;

use crate::accumulator::ResultsAccumulator;
use crate::credentials::Credentials;
use crate::engine::{EngineId, SearchEngine, create_engine};
use crate::error::SearchError;
use crate::site::SiteList;
use crate::types::{BookCandidate, SearchQuery};

const DEFAULT_WORKERS: usize = 4;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything one search produced.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    /// Merged description for an ISBN search with at least one answer.
    pub merged: Option<BookCandidate>,
    /// Sites that contributed to `merged`, most reliable first.
    pub sources: Vec<EngineId>,
    /// Each answering site's candidates, most reliable site first.
    pub per_site: Vec<(EngineId, Vec<BookCandidate>)>,
    /// Sites that failed. Not-found answers are not errors.
    pub errors: Vec<(EngineId, SearchError)>,
    /// Sites that did not answer in time.
    pub timed_out: Vec<EngineId>,
}

impl SearchOutcome {
    pub fn candidate_count(&self) -> usize {
        self.per_site.iter().map(|(_, c)| c.len()).sum()
    }
}

pub struct SearchCoordinator {
    engines: Vec<Arc<dyn SearchEngine>>,
    workers: usize,
    timeout: Duration,
}

impl SearchCoordinator {
    pub fn new(engines: Vec<Arc<dyn SearchEngine>>) -> Self {
        Self {
            engines,
            workers: DEFAULT_WORKERS,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Engines for the enabled sites of `sites`. Sites with no engine
    /// implementation are skipped.
    pub fn from_sites(sites: &SiteList, creds: &Credentials) -> Result<Self, SearchError> {
        let mut engines = Vec::new();
        for id in sites.by_reliability() {
            match create_engine(id, creds)? {
                Some(engine) => engines.push(engine),
                None => log::debug!("No search engine for {id}, skipping"),
            }
        }
        Ok(Self::new(engines))
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Per-site time limit.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn engines(&self) -> impl Iterator<Item = EngineId> + '_ {
        self.engines.iter().map(|e| e.id())
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome, SearchError> {
        if query.is_empty() {
            return Err(SearchError::Query("nothing to search for".into()));
        }
        let query = match query.isbn.as_deref() {
            Some(raw) if !raw.trim().is_empty() => {
                let isbn = normalize_isbn(raw)
                    .ok_or_else(|| SearchError::Query(format!("'{}' is not a valid ISBN", raw.trim())))?;
                SearchQuery::isbn(isbn)
            }
            _ => SearchQuery::text(query.title.clone(), query.author.clone()),
        };
        if self.engines.is_empty() {
            log::warn!("No search sites enabled");
            return Ok(SearchOutcome::default());
        }

        let shared = Arc::new(query.clone());
        let pool = WorkerPool::start_with_timeout(
            self.workers,
            self.engines.clone(),
            self.timeout,
            move |engine: Arc<dyn SearchEngine>| {
                let query = shared.clone();
                async move {
                    let id = engine.id();
                    let result = match query.isbn.as_deref() {
                        Some(isbn) => engine.search_by_isbn(isbn).await,
                        None => engine.search(&query).await,
                    };
                    (id, result)
                }
            },
        );
        let mut answers = pool.collect().await;
        answers.sort_by_key(|(id, _)| reliability_rank(*id));

        let mut outcome = SearchOutcome::default();
        let mut answered = Vec::with_capacity(answers.len());
        for (id, result) in answers {
            answered.push(id);
            match result {
                Ok(found) if !found.is_empty() => outcome.per_site.push((id, found)),
                Ok(_) | Err(SearchError::NotFound) => log::debug!("{id}: nothing found"),
                Err(e) => {
                    log::warn!("{id}: {e}");
                    outcome.errors.push((id, e));
                }
            }
        }
        outcome.timed_out = self
            .engines()
            .filter(|id| !answered.contains(id))
            .collect();

        if let Some(isbn) = &query.isbn {
            let mut acc = ResultsAccumulator::for_isbn(isbn.clone());
            for (_, found) in &outcome.per_site {
                for candidate in found {
                    acc.add(candidate);
                }
            }
            outcome.sources = acc.sources().to_vec();
            outcome.merged = acc.finish();
        }
        log::info!(
            "Search: {} candidate(s) from {} site(s), {} error(s)",
            outcome.candidate_count(),
            outcome.per_site.len(),
            outcome.errors.len()
        );
        Ok(outcome)
    }
}

fn reliability_rank(id: EngineId) -> usize {
    EngineId::DATA_RELIABILITY_ORDER
        .iter()
        .position(|&e| e == id)
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
#[path = "tests/coordinator_tests.rs"]
mod tests;
