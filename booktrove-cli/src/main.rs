//! booktrove CLI
//!
//! Command-line interface for a personal book catalogue: list and edit books,
//! write and restore backup archives, and look books up online.

mod cli_types;
mod commands;
mod error;
mod progress;

use std::fs::File;
use std::io::Write;

use clap::Parser;
use env_logger::{Builder, Target};
use log::LevelFilter;

pub(crate) use error::CliError;

use cli_types::{BooksAction, Cli, Commands, ConfigAction, SitesAction};
use commands::Paths;
use commands::archive::{run_export, run_import, run_info};
use commands::books::{
    run_books_add, run_books_delete, run_books_list, run_books_show, run_books_stats,
    run_books_styles,
};
use commands::config::{run_config_path, run_config_set, run_config_set_key, run_config_show};
use commands::search::run_search;
use commands::sites::{run_sites_enable, run_sites_list, run_sites_order, run_sites_reset};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Error: cannot open log file: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

/// Route `log` output to stdout (or `--logfile`). Info lines are printed
/// bare so normal command output reads like plain text.
fn init_logging(cli: &Cli) -> std::io::Result<()> {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let mut builder = Builder::new();
    builder.filter_level(level).parse_env("BOOKTROVE_LOG");

    let verbose = cli.verbose;
    builder.format(move |buf, record| {
        if verbose {
            writeln!(
                buf,
                "{} {:<5} {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        } else if record.level() == log::Level::Info {
            writeln!(buf, "{}", record.args())
        } else {
            writeln!(buf, "{}: {}", record.level(), record.args())
        }
    });

    match &cli.logfile {
        Some(path) => {
            let file = File::create(path)?;
            builder.target(Target::Pipe(Box::new(strip_ansi_escapes::Writer::new(file))));
        }
        None => {
            builder.target(Target::Stdout);
        }
    }
    builder.init();
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let paths = Paths::resolve(cli.db, cli.covers_dir);
    let quiet = cli.quiet;

    match cli.command {
        Commands::Books { action } => match action {
            BooksAction::List { query, style } => run_books_list(&paths, query, style),
            BooksAction::Add {
                title,
                author,
                isbn,
                publisher,
                date,
            } => run_books_add(&paths, title, author, isbn, publisher, date),
            BooksAction::Show { id } => run_books_show(&paths, id),
            BooksAction::Delete { id, confirm } => run_books_delete(&paths, id, confirm),
            BooksAction::Stats => run_books_stats(&paths),
            BooksAction::Styles => run_books_styles(&paths),
        },
        Commands::Export {
            path,
            incremental,
            json,
            types,
        } => run_export(paths, path, incremental, types, json, quiet),
        Commands::Import {
            path,
            policy,
            json,
            types,
        } => run_import(paths, path, policy, types, json, quiet),
        Commands::Info { path } => run_info(path),
        Commands::Search {
            isbn,
            title,
            author,
            add,
            timeout,
        } => run_search(&paths, isbn, title, author, add, timeout),
        Commands::Sites { action } => match action {
            SitesAction::List { site_type } => run_sites_list(&paths, site_type),
            SitesAction::Order { site_type, sites } => run_sites_order(&paths, site_type, sites),
            SitesAction::Enable { site, site_type } => {
                run_sites_enable(&paths, site, site_type, true)
            }
            SitesAction::Disable { site, site_type } => {
                run_sites_enable(&paths, site, site_type, false)
            }
            SitesAction::Reset { site_type } => run_sites_reset(&paths, site_type),
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => run_config_show(&paths),
            ConfigAction::Path => {
                run_config_path();
                Ok(())
            }
            ConfigAction::Set { key, value } => run_config_set(&key, value),
            ConfigAction::SetKey { key } => run_config_set_key(key),
        },
    }
}
