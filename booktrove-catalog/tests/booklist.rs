use booktrove_catalog::{
    Author, Book, BookSeries, BookSort, BooklistGroup, Style, build_booklist, default_style,
};

fn book(id: i64, title: &str) -> Book {
    Book {
        id,
        ..Book::new(title)
    }
}

fn style(groups: Vec<BooklistGroup>, sort: BookSort) -> Style {
    Style {
        groups,
        sort,
        ..default_style()
    }
}

#[test]
fn groups_by_author_then_series() {
    let books = vec![
        book(1, "The Colour of Magic")
            .with_author(Author::new("Pratchett", "Terry"))
            .with_series(BookSeries::new("Discworld", Some("1"))),
        book(2, "Good Omens")
            .with_author(Author::new("Pratchett", "Terry"))
            .with_author(Author::new("Gaiman", "Neil")),
        book(3, "Mort")
            .with_author(Author::new("Pratchett", "Terry"))
            .with_series(BookSeries::new("Discworld", Some("4"))),
    ];

    let rows = build_booklist(&books, &default_style());
    let flat: Vec<(usize, &str)> = rows.iter().map(|r| (r.level, r.label.as_str())).collect();
    assert_eq!(
        flat,
        vec![
            (0, "Gaiman, Neil"),
            (1, "(unknown)"),
            (2, "Good Omens"),
            (0, "Pratchett, Terry"),
            (1, "Discworld"),
            (2, "Mort"),
            (2, "The Colour of Magic"),
            (1, "(unknown)"),
            (2, "Good Omens"),
        ]
    );
}

#[test]
fn unknown_bucket_sorts_last_and_keys_ignore_case() {
    let mut a = book(1, "A");
    a.publishers.push("tor".into());
    let mut b = book(2, "B");
    b.publishers.push("Tor".into());
    let c = book(3, "C");
    let mut d = book(4, "D");
    d.publishers.push("Ace".into());

    let rows = build_booklist(&[a, b, c, d], &style(vec![BooklistGroup::Publisher], BookSort::TitleAsc));
    let headers: Vec<&str> = rows
        .iter()
        .filter(|r| r.is_header())
        .map(|r| r.label.as_str())
        .collect();
    assert_eq!(headers, vec!["Ace", "tor", "(unknown)"]);
    assert_eq!(rows.len(), 3 + 4);
}

#[test]
fn no_groups_lists_books_in_sort_order() {
    let books = vec![book(1, "beta"), book(2, "Alpha"), book(3, "gamma")];

    let asc = build_booklist(&books, &style(vec![], BookSort::TitleAsc));
    let ids: Vec<_> = asc.iter().filter_map(|r| r.book_id).collect();
    assert_eq!(ids, vec![2, 1, 3]);
    assert!(asc.iter().all(|r| r.level == 0));

    let desc = build_booklist(&books, &style(vec![], BookSort::TitleDesc));
    let ids: Vec<_> = desc.iter().filter_map(|r| r.book_id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[test]
fn year_published_groups_partial_dates() {
    let mut a = book(1, "A");
    a.date_published = Some("1983".into());
    let mut b = book(2, "B");
    b.date_published = Some("1983-11-24".into());
    let mut c = book(3, "C");
    c.date_published = Some("1979-06".into());

    let rows = build_booklist(
        &[a, b, c],
        &style(vec![BooklistGroup::YearPublished], BookSort::DatePublished),
    );
    let flat: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(flat, vec!["1979", "C", "1983", "A", "B"]);
}

#[test]
fn empty_catalogue_yields_no_rows() {
    assert!(build_booklist(&[], &default_style()).is_empty());
}
