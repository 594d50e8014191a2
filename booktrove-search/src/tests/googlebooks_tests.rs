use super::*;

const FIXTURE: &str = r#"{
  "kind": "books#volumes",
  "totalItems": 1,
  "items": [
    {
      "id": "zyTCAlFPjgYC",
      "volumeInfo": {
        "title": "The Google Story",
        "subtitle": "Inside the Hottest Business",
        "authors": ["David A. Vise", "Mark Malseed"],
        "publisher": "Random House Digital, Inc.",
        "publishedDate": "2005-11-15",
        "description": "Here is the story behind one of the most remarkable Internet successes.",
        "industryIdentifiers": [
          {"type": "ISBN_10", "identifier": "055380457X"},
          {"type": "ISBN_13", "identifier": "9780553804577"}
        ],
        "pageCount": 207,
        "language": "en",
        "imageLinks": {
          "smallThumbnail": "http://books.google.com/books/content?id=zyTCAlFPjgYC&zoom=5",
          "thumbnail": "http://books.google.com/books/content?id=zyTCAlFPjgYC&zoom=1"
        }
      }
    },
    {"id": "noinfo"}
  ]
}"#;

#[test]
fn parses_volume() {
    let found = parse_volumes(FIXTURE).unwrap();
    assert_eq!(found.len(), 1, "items without volumeInfo are dropped");
    let c = &found[0];
    assert_eq!(c.source, EngineId::GoogleBooks);
    assert_eq!(c.external_id.as_deref(), Some("zyTCAlFPjgYC"));
    assert_eq!(
        c.title.as_deref(),
        Some("The Google Story: Inside the Hottest Business")
    );
    assert_eq!(c.authors.len(), 2);
    assert_eq!(c.publishers, vec!["Random House Digital, Inc."]);
    assert_eq!(c.date_published.as_deref(), Some("2005-11-15"));
    assert_eq!(c.isbn.as_deref(), Some("9780553804577"));
    assert_eq!(c.page_count, Some(207));
    assert_eq!(c.language.as_deref(), Some("en"));
    assert_eq!(
        c.cover_urls,
        vec!["https://books.google.com/books/content?id=zyTCAlFPjgYC&zoom=1"]
    );
}

#[test]
fn no_items_is_empty() {
    let found = parse_volumes(r#"{"kind": "books#volumes", "totalItems": 0}"#).unwrap();
    assert!(found.is_empty());
}

#[test]
fn zero_page_count_is_dropped() {
    let body = r#"{"items": [{"volumeInfo": {"title": "T", "pageCount": 0,
        "industryIdentifiers": [{"type": "OTHER", "identifier": "UOM:39015"}]}}]}"#;
    let c = &parse_volumes(body).unwrap()[0];
    assert_eq!(c.page_count, None);
    assert_eq!(c.isbn, None);
}

#[test]
fn query_building() {
    assert_eq!(
        build_query(&SearchQuery::isbn(" 9780553804577 ")).as_deref(),
        Some("isbn:9780553804577")
    );
    let q = SearchQuery::text(Some("Dune".into()), Some("Herbert".into()));
    assert_eq!(build_query(&q).as_deref(), Some("intitle:Dune+inauthor:Herbert"));
    let q = SearchQuery::text(None, Some("Herbert".into()));
    assert_eq!(build_query(&q).as_deref(), Some("inauthor:Herbert"));
    assert_eq!(build_query(&SearchQuery::default()), None);
}
