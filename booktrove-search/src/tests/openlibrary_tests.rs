use super::*;

const BOOKS_FIXTURE: &str = r#"{
  "ISBN:9780575041158": {
    "url": "https://openlibrary.org/books/OL7825227M/Guards!_Guards!",
    "title": "Guards! Guards!",
    "authors": [{"url": "https://openlibrary.org/authors/OL25712A", "name": "Terry Pratchett"}],
    "publishers": [{"name": "Gollancz"}],
    "publish_date": "May 1989",
    "number_of_pages": 288,
    "identifiers": {
      "isbn_10": ["0575041153"],
      "isbn_13": ["9780575041158"],
      "openlibrary": ["OL7825227M"]
    },
    "cover": {
      "small": "https://covers.openlibrary.org/b/id/123-S.jpg",
      "medium": "https://covers.openlibrary.org/b/id/123-M.jpg",
      "large": "https://covers.openlibrary.org/b/id/123-L.jpg"
    },
    "notes": {"type": "/type/text", "value": "A Discworld novel."}
  }
}"#;

#[test]
fn parses_isbn_lookup() {
    let found = parse_books_response(BOOKS_FIXTURE, "9780575041158").unwrap();
    assert_eq!(found.len(), 1);
    let c = &found[0];
    assert_eq!(c.source, EngineId::OpenLibrary);
    assert_eq!(c.title.as_deref(), Some("Guards! Guards!"));
    assert_eq!(c.authors, vec!["Terry Pratchett"]);
    assert_eq!(c.publishers, vec!["Gollancz"]);
    assert_eq!(c.date_published.as_deref(), Some("1989"));
    assert_eq!(c.isbn.as_deref(), Some("9780575041158"));
    assert_eq!(c.external_id.as_deref(), Some("OL7825227M"));
    assert_eq!(c.page_count, Some(288));
    assert_eq!(c.description.as_deref(), Some("A Discworld novel."));
    assert_eq!(c.cover_urls, vec!["https://covers.openlibrary.org/b/id/123-L.jpg"]);
}

#[test]
fn unknown_isbn_is_empty() {
    assert!(parse_books_response("{}", "9780000000002").unwrap().is_empty());
}

#[test]
fn minimal_edition_falls_back_to_requested_isbn() {
    let body = r#"{"ISBN:0441172717": {"title": "Dune", "subtitle": "Deluxe Edition", "notes": "Plain note"}}"#;
    let found = parse_books_response(body, "0441172717").unwrap();
    let c = &found[0];
    assert_eq!(c.title.as_deref(), Some("Dune: Deluxe Edition"));
    assert_eq!(c.isbn.as_deref(), Some("0441172717"));
    assert_eq!(c.description.as_deref(), Some("Plain note"));
    assert!(c.authors.is_empty());
    assert!(c.cover_urls.is_empty());
}

#[test]
fn malformed_body_is_a_parse_error() {
    let err = parse_books_response("[1,2", "x").unwrap_err();
    assert!(matches!(err, SearchError::Parse(_)));
}

#[test]
fn parses_free_search() {
    let body = r#"{
      "numFound": 2,
      "docs": [
        {
          "key": "/works/OL45804W",
          "title": "Fantastic Mr Fox",
          "author_name": ["Roald Dahl"],
          "isbn": ["0140328726", "9780140328721"],
          "publisher": ["Puffin", "Knopf"],
          "first_publish_year": 1970,
          "cover_i": 6498519,
          "language": ["eng"]
        },
        {"title": "Untitled"}
      ]
    }"#;
    let found = parse_search_response(body).unwrap();
    assert_eq!(found.len(), 2);
    let c = &found[0];
    assert_eq!(c.external_id.as_deref(), Some("/works/OL45804W"));
    assert_eq!(c.isbn.as_deref(), Some("9780140328721"));
    assert_eq!(c.publishers, vec!["Puffin"]);
    assert_eq!(c.date_published.as_deref(), Some("1970"));
    assert_eq!(c.language.as_deref(), Some("eng"));
    assert_eq!(
        c.cover_urls,
        vec!["https://covers.openlibrary.org/b/id/6498519-L.jpg"]
    );
    assert!(found[1].authors.is_empty());
    assert!(found[1].isbn.is_none());
}

#[test]
fn cover_urls_by_size() {
    assert_eq!(
        cover_url("9780575041158", CoverSize::Small),
        "https://covers.openlibrary.org/b/isbn/9780575041158-S.jpg?default=false"
    );
    assert!(cover_url("x", CoverSize::Large).contains("-L.jpg"));
}
