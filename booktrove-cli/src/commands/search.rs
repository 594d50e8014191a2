use booktrove_db::insert_book;
use booktrove_search::{BookCandidate, Credentials, SearchCoordinator, SearchQuery};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use tokio::time::Duration;

use super::sites::load_site_list;
use super::{Paths, runtime, truncate_str};
use crate::CliError;
use booktrove_search::SiteType;

pub(crate) fn run_search(
    paths: &Paths,
    isbn: Option<String>,
    title: Option<String>,
    author: Option<String>,
    add: bool,
    timeout: u64,
) -> Result<(), CliError> {
    let query = match isbn {
        Some(isbn) => SearchQuery::isbn(isbn),
        None => SearchQuery::text(title, author),
    };
    if query.is_empty() {
        return Err(CliError::invalid("Give --isbn, --title or --author"));
    }

    let mut prefs = paths.load_prefs()?;
    let sites = load_site_list(SiteType::Data, &mut prefs, &paths.prefs)?;
    let coordinator = SearchCoordinator::from_sites(&sites, &Credentials::load())?
        .with_timeout(Duration::from_secs(timeout));

    let outcome = runtime()?.block_on(coordinator.search(&query))?;

    for (site, candidates) in &outcome.per_site {
        log::info!("{}", site.name().if_supports_color(Stdout, |t| t.bold()));
        for c in candidates {
            print_candidate(c);
        }
    }
    for (site, err) in &outcome.errors {
        log::warn!("{site}: {err}");
        if err.is_credentials() {
            log::warn!("  Check the API key with 'booktrove config show'.");
        }
    }
    for site in &outcome.timed_out {
        log::warn!("{site}: no answer in {timeout}s");
    }

    let Some(merged) = outcome.merged else {
        if outcome.per_site.is_empty() {
            log::info!("Nothing found.");
        }
        return Ok(());
    };
    let sources: Vec<&str> = outcome.sources.iter().map(|s| s.name()).collect();
    log::info!("");
    log::info!(
        "{} (from {})",
        "Merged result".if_supports_color(Stdout, |t| t.green()),
        sources.join(", ")
    );
    print_candidate(&merged);

    if add {
        let Some(book) = merged.into_book() else {
            return Err(CliError::invalid("The merged result has no title"));
        };
        let conn = paths.open_catalog()?;
        let id = insert_book(&conn, &book)?;
        log::info!("Added {} as #{id}", book.title.if_supports_color(Stdout, |t| t.bold()));
    }
    Ok(())
}

fn print_candidate(c: &BookCandidate) {
    log::info!(
        "  {} {}",
        c.title.as_deref().unwrap_or("(no title)"),
        c.authors.join(", ").if_supports_color(Stdout, |t| t.cyan()),
    );
    let mut details = Vec::new();
    if let Some(isbn) = &c.isbn {
        details.push(format!("ISBN {isbn}"));
    }
    if let Some(p) = c.publishers.first() {
        details.push(p.clone());
    }
    if let Some(d) = &c.date_published {
        details.push(d.clone());
    }
    if let Some(n) = c.page_count {
        details.push(format!("{n} pages"));
    }
    if !details.is_empty() {
        log::info!("    {}", details.join(" | ").if_supports_color(Stdout, |t| t.dimmed()));
    }
    if let Some(desc) = &c.description {
        log::info!("    {}", truncate_str(desc, 100));
    }
    for url in &c.cover_urls {
        log::debug!("    cover: {url}");
    }
}
