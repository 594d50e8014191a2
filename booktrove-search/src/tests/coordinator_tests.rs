use futures::future::BoxFuture;

use super::*;
use crate::site::SiteType;

/// Engine that answers from a canned list after an optional delay.
struct Stub {
    id: EngineId,
    answer: fn(EngineId) -> Result<Vec<BookCandidate>, SearchError>,
    delay: Duration,
}

impl Stub {
    fn new(id: EngineId, answer: fn(EngineId) -> Result<Vec<BookCandidate>, SearchError>) -> Arc<dyn SearchEngine> {
        Arc::new(Self {
            id,
            answer,
            delay: Duration::ZERO,
        })
    }
}

impl SearchEngine for Stub {
    fn id(&self) -> EngineId {
        self.id
    }

    fn search_by_isbn<'a>(
        &'a self,
        _isbn: &'a str,
    ) -> BoxFuture<'a, Result<Vec<BookCandidate>, SearchError>> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            (self.answer)(self.id)
        })
    }

    fn search<'a>(
        &'a self,
        _query: &'a SearchQuery,
    ) -> BoxFuture<'a, Result<Vec<BookCandidate>, SearchError>> {
        self.search_by_isbn("")
    }
}

fn guards(id: EngineId) -> Result<Vec<BookCandidate>, SearchError> {
    let mut c = BookCandidate::new(id);
    c.isbn = Some("9780575041158".into());
    c.title = Some(format!("Guards! Guards! ({id})"));
    c.cover_urls = vec![format!("https://{}/cover.jpg", id.key())];
    if id == EngineId::OpenLibrary {
        c.page_count = Some(288);
    }
    Ok(vec![c])
}

fn wrong_book(id: EngineId) -> Result<Vec<BookCandidate>, SearchError> {
    let mut c = BookCandidate::new(id);
    c.isbn = Some("9780441172719".into());
    c.title = Some("Dune".into());
    Ok(vec![c])
}

fn not_found(_: EngineId) -> Result<Vec<BookCandidate>, SearchError> {
    Err(SearchError::NotFound)
}

fn bad_key(_: EngineId) -> Result<Vec<BookCandidate>, SearchError> {
    Err(SearchError::Credentials("HTTP 403".into()))
}

#[tokio::test]
async fn isbn_search_merges_in_reliability_order() {
    let coordinator = SearchCoordinator::new(vec![
        Stub::new(EngineId::OpenLibrary, guards),
        Stub::new(EngineId::GoogleBooks, guards),
        Stub::new(EngineId::Isfdb, guards),
        Stub::new(EngineId::Amazon, wrong_book),
    ]);
    let outcome = coordinator
        .search(&SearchQuery::isbn("0-575-04115-3"))
        .await
        .unwrap();

    let order: Vec<EngineId> = outcome.per_site.iter().map(|(id, _)| *id).collect();
    assert_eq!(
        order,
        vec![EngineId::Isfdb, EngineId::Amazon, EngineId::GoogleBooks, EngineId::OpenLibrary]
    );
    assert_eq!(
        outcome.sources,
        vec![EngineId::Isfdb, EngineId::GoogleBooks, EngineId::OpenLibrary]
    );
    let merged = outcome.merged.unwrap();
    assert_eq!(merged.title.as_deref(), Some("Guards! Guards! (ISFDB)"));
    assert_eq!(merged.page_count, Some(288));
    assert_eq!(merged.cover_urls.len(), 3);
    assert!(outcome.errors.is_empty());
}

#[tokio::test]
async fn failures_are_reported_per_site() {
    let coordinator = SearchCoordinator::new(vec![
        Stub::new(EngineId::GoogleBooks, bad_key),
        Stub::new(EngineId::OpenLibrary, not_found),
    ]);
    let outcome = coordinator
        .search(&SearchQuery::isbn("9780575041158"))
        .await
        .unwrap();
    assert!(outcome.merged.is_none());
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].0, EngineId::GoogleBooks);
    assert!(outcome.errors[0].1.is_credentials());
}

#[tokio::test]
async fn slow_sites_time_out() {
    let slow: Arc<dyn SearchEngine> = Arc::new(Stub {
        id: EngineId::GoogleBooks,
        answer: guards,
        delay: Duration::from_secs(5),
    });
    let coordinator = SearchCoordinator::new(vec![slow, Stub::new(EngineId::OpenLibrary, guards)])
        .with_timeout(Duration::from_millis(100));
    let outcome = coordinator
        .search(&SearchQuery::isbn("9780575041158"))
        .await
        .unwrap();
    assert_eq!(outcome.timed_out, vec![EngineId::GoogleBooks]);
    assert_eq!(outcome.sources, vec![EngineId::OpenLibrary]);
}

#[tokio::test]
async fn text_search_is_not_merged() {
    let coordinator = SearchCoordinator::new(vec![
        Stub::new(EngineId::OpenLibrary, guards),
        Stub::new(EngineId::GoogleBooks, wrong_book),
    ]);
    let outcome = coordinator
        .search(&SearchQuery::text(Some("guards".into()), None))
        .await
        .unwrap();
    assert!(outcome.merged.is_none());
    assert_eq!(outcome.candidate_count(), 2);
}

#[tokio::test]
async fn bad_queries_are_rejected() {
    let coordinator = SearchCoordinator::new(vec![Stub::new(EngineId::OpenLibrary, guards)]);
    let empty = coordinator.search(&SearchQuery::default()).await;
    assert!(matches!(empty, Err(SearchError::Query(_))));
    let bad_isbn = coordinator.search(&SearchQuery::isbn("12345")).await;
    assert!(matches!(bad_isbn, Err(SearchError::Query(_))));
}

#[test]
fn engines_follow_enabled_sites() {
    let mut sites = SiteList::new(SiteType::Data);
    let coordinator = SearchCoordinator::from_sites(&sites, &Credentials::default()).unwrap();
    let ids: Vec<EngineId> = coordinator.engines().collect();
    assert_eq!(ids, vec![EngineId::GoogleBooks, EngineId::OpenLibrary]);

    sites.set_enabled(EngineId::GoogleBooks, false);
    let coordinator = SearchCoordinator::from_sites(&sites, &Credentials::default()).unwrap();
    assert_eq!(coordinator.engines().collect::<Vec<_>>(), vec![EngineId::OpenLibrary]);
}
