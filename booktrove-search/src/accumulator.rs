//! Merges candidates from several sites into one book description.
//!
//! Feed sites most reliable first. A scalar field takes the first non-empty
//! value seen; a list field (authors, publishers) comes whole from the first
//! site that has one. Cover URLs are collected from every site.

use crate::engine::EngineId;
use crate::types::BookCandidate;

#[derive(Debug, Default)]
pub struct ResultsAccumulator {
    isbn: Option<String>,
    merged: Option<BookCandidate>,
    sources: Vec<EngineId>,
    rejected: usize,
}

impl ResultsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept candidates for this ISBN. A candidate without an ISBN is
    /// still accepted.
    pub fn for_isbn(isbn: impl Into<String>) -> Self {
        Self {
            isbn: Some(isbn.into()),
            ..Self::default()
        }
    }

    /// Merge one candidate. Returns `false` if it was rejected for naming a
    /// different ISBN.
    pub fn add(&mut self, candidate: &BookCandidate) -> bool {
        if let Some(isbn) = &self.isbn {
            if !candidate.matches_isbn(isbn) {
                log::debug!(
                    "{}: ignoring result for ISBN {:?}, wanted {isbn}",
                    candidate.source,
                    candidate.isbn
                );
                self.rejected += 1;
                return false;
            }
        }
        if !self.sources.contains(&candidate.source) {
            self.sources.push(candidate.source);
        }

        let merged = self.merged.get_or_insert_with(|| {
            let mut first = candidate.clone();
            first.cover_urls.clear();
            first
        });

        fill(&mut merged.title, &candidate.title);
        fill(&mut merged.isbn, &candidate.isbn);
        fill(&mut merged.date_published, &candidate.date_published);
        fill(&mut merged.language, &candidate.language);
        fill(&mut merged.description, &candidate.description);
        if merged.page_count.is_none() {
            merged.page_count = candidate.page_count;
        }
        if merged.authors.is_empty() {
            merged.authors = candidate.authors.clone();
        }
        if merged.publishers.is_empty() {
            merged.publishers = candidate.publishers.clone();
        }
        for url in &candidate.cover_urls {
            if !merged.cover_urls.contains(url) {
                merged.cover_urls.push(url.clone());
            }
        }
        true
    }

    /// Sites that contributed, in the order they were added.
    pub fn sources(&self) -> &[EngineId] {
        &self.sources
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn is_empty(&self) -> bool {
        self.merged.is_none()
    }

    /// The merged candidate. Its `source` is the first contributing site.
    pub fn finish(self) -> Option<BookCandidate> {
        self.merged
    }
}

fn fill(target: &mut Option<String>, value: &Option<String>) {
    let blank = target.as_deref().is_none_or(|s| s.trim().is_empty());
    if blank {
        if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            *target = Some(v.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(source: EngineId) -> BookCandidate {
        BookCandidate::new(source)
    }

    #[test]
    fn first_non_empty_value_wins() {
        let mut isfdb = candidate(EngineId::Isfdb);
        isfdb.title = Some("Guards! Guards!".into());
        isfdb.description = Some("  ".into());
        isfdb.cover_urls = vec!["a.jpg".into(), "a.jpg".into()];

        let mut google = candidate(EngineId::GoogleBooks);
        google.title = Some("Guards Guards".into());
        google.description = Some("City watch".into());
        google.authors = vec!["Terry Pratchett".into()];
        google.cover_urls = vec!["b.jpg".into(), "a.jpg".into()];

        let mut open = candidate(EngineId::OpenLibrary);
        open.authors = vec!["Pratchett, Terry".into(), "Someone Else".into()];
        open.page_count = Some(288);

        let mut acc = ResultsAccumulator::new();
        for c in [&isfdb, &google, &open] {
            assert!(acc.add(c));
        }
        assert_eq!(
            acc.sources(),
            &[EngineId::Isfdb, EngineId::GoogleBooks, EngineId::OpenLibrary]
        );
        let merged = acc.finish().unwrap();
        assert_eq!(merged.source, EngineId::Isfdb);
        assert_eq!(merged.title.as_deref(), Some("Guards! Guards!"));
        assert_eq!(merged.description.as_deref(), Some("City watch"));
        assert_eq!(merged.authors, vec!["Terry Pratchett"]);
        assert_eq!(merged.page_count, Some(288));
        assert_eq!(merged.cover_urls, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn other_isbns_are_rejected() {
        let mut acc = ResultsAccumulator::for_isbn("9780575041158");
        let mut wrong = candidate(EngineId::GoogleBooks);
        wrong.isbn = Some("9780441172719".into());
        wrong.title = Some("Dune".into());
        let mut right = candidate(EngineId::OpenLibrary);
        right.isbn = Some("0575041153".into());
        right.title = Some("Guards! Guards!".into());

        assert!(!acc.add(&wrong));
        assert!(acc.is_empty());
        assert!(acc.add(&right));
        assert_eq!(acc.rejected(), 1);
        assert_eq!(acc.finish().unwrap().title.as_deref(), Some("Guards! Guards!"));
    }
}
