use std::collections::HashSet;

use booktrove_catalog::{Author, Book, Style, build_booklist, builtin_styles, load_styles, normalize_isbn};
use booktrove_db::{
    catalog_stats, delete_book, find_book_by_id, insert_book, list_books, list_styles, search_books,
};
use booktrove_lib::settings::styles_dir;
use booktrove_search::normalize_date;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use rusqlite::Connection;

use super::{Paths, truncate_str};
use crate::CliError;

pub(crate) fn run_books_list(
    paths: &Paths,
    query: Option<String>,
    style: Option<String>,
) -> Result<(), CliError> {
    let conn = paths.open_catalog()?;
    let books = match query.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => search_books(&conn, q)?,
        _ => list_books(&conn)?,
    };
    if books.is_empty() {
        log::info!("No books found.");
        return Ok(());
    }

    match style {
        Some(name) => {
            let style = all_styles(&conn)?
                .into_iter()
                .find(|s| s.name.eq_ignore_ascii_case(&name) || s.uuid == name)
                .ok_or_else(|| CliError::not_found(format!("style '{name}'")))?;
            print_booklist(&books, &style);
        }
        None => {
            for book in &books {
                print_book_line(book);
            }
        }
    }
    log::info!("");
    log::info!("{} book(s)", books.len());
    Ok(())
}

fn print_book_line(book: &Book) {
    let author = book
        .primary_author()
        .map(Author::display_name)
        .unwrap_or_default();
    log::info!(
        "{:>5}  {:<40}  {}",
        book.id.if_supports_color(Stdout, |t| t.dimmed()),
        truncate_str(&book.title, 40),
        author.if_supports_color(Stdout, |t| t.cyan()),
    );
}

fn print_booklist(books: &[Book], style: &Style) {
    let titles: std::collections::HashMap<i64, &Book> = books.iter().map(|b| (b.id, b)).collect();
    for row in build_booklist(books, style) {
        let indent = "  ".repeat(row.level);
        match row.book_id.and_then(|id| titles.get(&id)) {
            Some(book) => log::info!(
                "{indent}{} {}",
                truncate_str(&book.title, 60),
                format!("#{}", book.id).if_supports_color(Stdout, |t| t.dimmed()),
            ),
            None => log::info!("{indent}{}", row.label.if_supports_color(Stdout, |t| t.bold())),
        }
    }
}

/// Built-in styles, then stored ones, then those in the styles folder. The
/// first style with a given uuid wins.
fn all_styles(conn: &Connection) -> Result<Vec<Style>, CliError> {
    let mut seen = HashSet::new();
    let mut styles = Vec::new();
    let from_dir = load_styles(&styles_dir())?;
    for style in builtin_styles().into_iter().chain(list_styles(conn)?).chain(from_dir) {
        if seen.insert(style.uuid.clone()) {
            styles.push(style);
        }
    }
    Ok(styles)
}

pub(crate) fn run_books_styles(paths: &Paths) -> Result<(), CliError> {
    let conn = paths.open_catalog()?;
    for style in all_styles(&conn)? {
        let groups: Vec<&str> = style.groups.iter().map(|g| g.label()).collect();
        log::info!(
            "  {:<20} {}{}",
            style.name.if_supports_color(Stdout, |t| t.bold()),
            groups.join(" > "),
            if style.builtin {
                format!(" {}", "(built-in)".if_supports_color(Stdout, |t| t.dimmed()))
            } else {
                String::new()
            },
        );
    }
    Ok(())
}

pub(crate) fn run_books_add(
    paths: &Paths,
    title: String,
    authors: Vec<String>,
    isbn: Option<String>,
    publisher: Option<String>,
    date: Option<String>,
) -> Result<(), CliError> {
    let mut book = Book::new(title);
    book.authors = authors.iter().map(|a| Author::parse(a)).collect();
    if let Some(raw) = isbn {
        let isbn = normalize_isbn(&raw)
            .ok_or_else(|| CliError::invalid(format!("'{raw}' is not a valid ISBN")))?;
        book.isbn = Some(isbn);
    }
    book.publishers = publisher.into_iter().collect();
    if let Some(raw) = date {
        let date = normalize_date(&raw)
            .ok_or_else(|| CliError::invalid(format!("'{raw}' is not a date")))?;
        book.date_published = Some(date);
    }

    let conn = paths.open_catalog()?;
    let id = insert_book(&conn, &book)?;
    log::info!(
        "Added {} as #{id}",
        book.title.if_supports_color(Stdout, |t| t.bold())
    );
    Ok(())
}

pub(crate) fn run_books_show(paths: &Paths, id: i64) -> Result<(), CliError> {
    let conn = paths.open_catalog()?;
    let book =
        find_book_by_id(&conn, id)?.ok_or_else(|| CliError::not_found(format!("book #{id}")))?;
    print_book(&book);
    Ok(())
}

fn print_book(book: &Book) {
    log::info!("{}", book.title.if_supports_color(Stdout, |t| t.bold()));
    let field = |label: &str, value: Option<String>| {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            log::info!("  {label:<12} {v}");
        }
    };
    let authors: Vec<String> = book.authors.iter().map(Author::display_name).collect();
    field("Author(s):", Some(authors.join("; ")));
    let series: Vec<String> = book.series.iter().map(|s| s.label()).collect();
    field("Series:", Some(series.join("; ")));
    field("ISBN:", book.isbn.clone());
    field("Publisher:", Some(book.publishers.join("; ")));
    field("Published:", book.date_published.clone());
    field("Language:", book.language.clone());
    field("Format:", book.format.clone());
    field(
        "Price:",
        book.price.as_ref().map(|p| format!("{:.2} {}", p.amount, p.currency)),
    );
    field("Shelves:", Some(book.bookshelves.join(", ")));
    field("Covers:", Some(book.covers.join(", ")));
    field("Added:", Some(book.date_added.clone()));
    field("Updated:", Some(book.last_updated.clone()));
    field("UUID:", Some(book.uuid.clone()));
    if let Some(desc) = book.description.as_deref().filter(|d| !d.is_empty()) {
        log::info!("");
        log::info!("  {}", truncate_str(desc, 400));
    }
}

pub(crate) fn run_books_delete(paths: &Paths, id: i64, confirm: bool) -> Result<(), CliError> {
    let conn = paths.open_catalog()?;
    let book =
        find_book_by_id(&conn, id)?.ok_or_else(|| CliError::not_found(format!("book #{id}")))?;
    if !confirm {
        log::warn!(
            "This will delete '{}' (#{id}). Re-run with --confirm to proceed.",
            book.title
        );
        return Ok(());
    }
    if delete_book(&conn, id)? {
        log::info!("Deleted '{}'", book.title);
    }
    Ok(())
}

pub(crate) fn run_books_stats(paths: &Paths) -> Result<(), CliError> {
    let conn = paths.open_catalog()?;
    let stats = catalog_stats(&conn)?;
    log::info!("{}", "Catalogue Statistics".if_supports_color(Stdout, |t| t.bold()));
    log::info!("  Database: {}", paths.db.display());
    log::info!("");
    log::info!("  Books:       {:>8}", stats.books);
    log::info!("  Authors:     {:>8}", stats.authors);
    log::info!("  Series:      {:>8}", stats.series);
    log::info!("  Publishers:  {:>8}", stats.publishers);
    log::info!("  Bookshelves: {:>8}", stats.bookshelves);
    log::info!("  Covers:      {:>8}", stats.covers);
    log::info!("  Styles:      {:>8}", stats.styles);
    if let Some(last) = stats.last_updated {
        log::info!("  Last change: {last}");
    }
    Ok(())
}
