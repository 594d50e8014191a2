use super::*;

#[test]
fn failures_beyond_the_cap_are_counted_but_not_kept() {
    let mut results = ImportResults::default();
    for row in 1..=16 {
        results.record_failure(row, "missing title", None);
    }
    assert_eq!(results.books_failed, 16);
    assert_eq!(results.failures.len(), MAX_FAILURE_DETAILS);
    assert_eq!(results.failures[0].row, 1);
    assert_eq!(results.failures[9].row, 10);
}

#[test]
fn cover_failures_share_the_detail_list() {
    let mut results = ImportResults::default();
    results.record_failure(3, "constraint failed", Some("Dune"));
    results.record_cover_failure("abc.jpg", "disk full");

    assert_eq!(results.books_failed, 1);
    assert_eq!(results.covers_failed, 1);
    assert_eq!(results.total_failed(), 2);
    assert_eq!(results.failures[1].context.as_deref(), Some("abc.jpg"));
    assert_eq!(results.failures[1].row, 0);
}

#[test]
fn merge_sums_counters_and_recaps_details() {
    let mut a = ImportResults {
        books_processed: 10,
        books_created: 4,
        books_skipped: 2,
        covers_created: 3,
        preferences: 5,
        ..Default::default()
    };
    for row in 0..6 {
        a.record_failure(row, "bad", None);
    }
    let mut b = ImportResults {
        books_processed: 7,
        books_updated: 7,
        styles: 2,
        ..Default::default()
    };
    for row in 0..7 {
        b.record_failure(row, "worse", None);
    }

    a.merge(&b);
    assert_eq!(a.books_processed, 17);
    assert_eq!(a.books_created, 4);
    assert_eq!(a.books_updated, 7);
    assert_eq!(a.books_skipped, 2);
    assert_eq!(a.books_failed, 13);
    assert_eq!(a.covers_created, 3);
    assert_eq!(a.preferences, 5);
    assert_eq!(a.styles, 2);
    assert_eq!(a.failures.len(), MAX_FAILURE_DETAILS);
    assert_eq!(a.failures[5].error, "bad");
    assert_eq!(a.failures[6].error, "worse");
}

#[test]
fn merge_of_small_lists_keeps_everything() {
    let mut a = ExportResults::default();
    a.books.push(1);
    a.record_failure(0, "unreadable", Some("a.jpg"));
    let mut b = ExportResults::default();
    b.books.push(2);
    b.covers.push("x.png".into());
    b.record_failure(0, "unreadable", Some("b.jpg"));

    a.merge(&b);
    assert_eq!(a.books, vec![1, 2]);
    assert_eq!(a.cover_count(), 1);
    assert_eq!(a.failed, 2);
    assert_eq!(a.failures.len(), 2);
}

#[test]
fn results_serialize_to_json() {
    let mut results = ImportResults::default();
    results.record_failure(2, "missing title", None);
    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json["books_failed"], 1);
    assert_eq!(json["failures"][0]["row"], 2);
    assert!(json["failures"][0].get("context").is_none());
}
