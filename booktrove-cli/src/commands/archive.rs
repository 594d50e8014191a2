use std::path::{Path, PathBuf};

use booktrove_backup::{
    ArchiveReader, ArchiveWriter, ExportOptions, ExportResults, FailureDetail, ImportOptions,
    ImportResults, RecordType, RecordTypes,
};
use booktrove_lib::util::format_bytes;
use booktrove_lib::{ProgressListener, TaskContext, TaskError, TaskOutcome, TaskRunner};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use super::{Paths, cancel_on_ctrl_c, runtime};
use crate::CliError;
use crate::cli_types::{PolicyArg, RecordTypeArgs};
use crate::progress::BarListener;

fn record_types(args: RecordTypeArgs) -> RecordTypes {
    match args.types {
        Some(types) if !types.is_empty() => types.into_iter().collect(),
        _ => RecordTypes::all(),
    }
}

/// Unwrap a task outcome. A cancelled task gives its partial result, if any.
fn settle<R>(outcome: TaskOutcome<R, CliError>) -> Result<(Option<R>, bool), CliError> {
    match outcome {
        TaskOutcome::Finished(r) => Ok((Some(r), false)),
        TaskOutcome::Cancelled(partial) => Ok((partial, true)),
        TaskOutcome::Failed(TaskError::Work(e)) => Err(e),
        TaskOutcome::Failed(TaskError::Aborted(msg)) => Err(CliError::runtime(msg)),
    }
}

fn results_json<T: serde::Serialize>(results: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(results)
        .map_err(|e| CliError::runtime(format!("Cannot encode results: {e}")))
}

/// JSON goes straight to stdout so `--quiet` and `--logfile` never hide it.
fn print_json<T: serde::Serialize>(results: &T) -> Result<(), CliError> {
    println!("{}", results_json(results)?);
    Ok(())
}

// ── Export ──────────────────────────────────────────────────────────────────

pub(crate) fn run_export(
    paths: Paths,
    path: PathBuf,
    incremental: bool,
    types: RecordTypeArgs,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let options = ExportOptions {
        record_types: record_types(types),
        incremental,
    };
    log::debug!("Export options: {options:?}");
    let target = path.clone();

    let outcome = runtime()?.block_on(async move {
        let runner = TaskRunner::new();
        let handle = runner.spawn_exclusive(
            "Export",
            move |ctx: &TaskContext| -> Result<ExportResults, CliError> {
                let conn = paths.open_catalog()?;
                let mut prefs = paths.load_prefs()?;
                let writer = ArchiveWriter::new(options, &paths.covers);
                let results = writer.write_file(&conn, &mut prefs, &target, ctx)?;
                if !ctx.is_cancelled() {
                    prefs.save(&paths.prefs)?;
                }
                Ok(results)
            },
            BarListener::new(quiet),
        );
        cancel_on_ctrl_c(handle.canceller());
        handle.finish().await
    });

    match settle(outcome)? {
        (_, true) => log::warn!("Export cancelled; no archive written"),
        (Some(results), false) if json => print_json(&results)?,
        (Some(results), false) if results.is_empty() => {
            log::info!("Nothing to back up.");
        }
        (Some(results), false) => print_export(&results, &path),
        (None, false) => {}
    }
    Ok(())
}

fn print_export(results: &ExportResults, path: &Path) {
    log::info!(
        "{} {}",
        "Backup written:".if_supports_color(Stdout, |t| t.bold()),
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    if let Ok(meta) = std::fs::metadata(path) {
        log::info!("  Size:        {:>6}", format_bytes(meta.len()));
    }
    log::info!("  Books:       {:>6}", results.book_count());
    log::info!("  Covers:      {:>6}", results.cover_count());
    log::info!("  Styles:      {:>6}", results.styles);
    log::info!("  Preferences: {:>6}", results.preferences);
    if results.failed > 0 {
        log::warn!(
            "  {} item(s) could not be written",
            results.failed.if_supports_color(Stdout, |t| t.red()),
        );
        print_failures(&results.failures, results.failed);
    }
}

// ── Import ──────────────────────────────────────────────────────────────────

pub(crate) fn run_import(
    paths: Paths,
    path: PathBuf,
    policy: PolicyArg,
    types: RecordTypeArgs,
    json: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let options = ImportOptions {
        record_types: record_types(types),
        policy: policy.into(),
    };

    // Validate up front so a bad file fails before the progress bar appears.
    let mut reader = ArchiveReader::open(&path)?;
    let info = reader.validate()?.clone();
    log::info!(
        "Restoring {} (version {}, written {})",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
        info.archive_version,
        info.created.format("%Y-%m-%d %H:%M"),
    );

    let outcome = runtime()?.block_on(async move {
        let runner = TaskRunner::new();
        let handle = runner.spawn_exclusive(
            "Import",
            move |ctx: &TaskContext| -> Result<ImportResults, CliError> {
                let mut conn = paths.open_catalog()?;
                let mut prefs = paths.load_prefs()?;
                let results = reader.read(&mut conn, &mut prefs, &paths.covers, &options, ctx)?;
                if results.preferences > 0 {
                    prefs.save(&paths.prefs)?;
                }
                Ok(results)
            },
            BarListener::new(quiet),
        );
        cancel_on_ctrl_c(handle.canceller());
        handle.finish().await
    });

    let (results, cancelled) = settle(outcome)?;
    if cancelled {
        log::warn!("Import cancelled; books processed so far were kept");
    }
    match results {
        Some(results) if json => print_json(&results)?,
        Some(results) => print_import(&results),
        None => {}
    }
    Ok(())
}

fn print_import(r: &ImportResults) {
    log::info!("{}", "Import results".if_supports_color(Stdout, |t| t.bold()));
    log::info!(
        "  Books:  {} created, {} updated, {} skipped, {} failed",
        r.books_created.if_supports_color(Stdout, |t| t.green()),
        r.books_updated,
        r.books_skipped,
        r.books_failed,
    );
    log::info!(
        "  Covers: {} created, {} updated, {} skipped, {} failed",
        r.covers_created.if_supports_color(Stdout, |t| t.green()),
        r.covers_updated,
        r.covers_skipped,
        r.covers_failed,
    );
    log::info!("  Styles: {}, preferences: {}", r.styles, r.preferences);
    print_failures(&r.failures, r.total_failed());
}

fn print_failures(failures: &[FailureDetail], total: usize) {
    for f in failures {
        let context = f.context.as_deref().unwrap_or("");
        log::warn!("    row {}: {} {}", f.row, f.error, context.if_supports_color(Stdout, |t| t.dimmed()));
    }
    if total > failures.len() {
        log::warn!("    ... and {} more", total - failures.len());
    }
}

// ── Info ────────────────────────────────────────────────────────────────────

pub(crate) fn run_info(path: PathBuf) -> Result<(), CliError> {
    let mut reader = ArchiveReader::open(&path)?;
    let info = reader.read_info()?.clone();

    log::info!(
        "{} {}",
        "Archive".if_supports_color(Stdout, |t| t.bold()),
        path.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    log::info!("  Version:     {}", info.archive_version);
    if !info.app_version.is_empty() {
        log::info!("  Written by:  booktrove {}", info.app_version);
    }
    log::info!("  Created:     {}", info.created.format("%Y-%m-%d %H:%M:%S UTC"));
    log::info!("  Incremental: {}", if info.incremental { "yes" } else { "no" });

    let mut contents = Vec::new();
    if let Some(n) = info.book_count {
        contents.push(format!("{n} {}", RecordType::Books));
    }
    if let Some(n) = info.cover_count {
        contents.push(format!("{n} {}", RecordType::Covers));
    }
    if info.has_styles {
        contents.push(RecordType::Styles.to_string());
    }
    if info.has_preferences {
        contents.push(RecordType::Preferences.to_string());
    }
    log::info!("  Contents:    {}", contents.join(", "));

    match info.validate() {
        Ok(()) => log::info!("  Status:      {}", "can be imported".if_supports_color(Stdout, |t| t.green())),
        Err(e) => log::warn!("  Status:      {}", e.if_supports_color(Stdout, |t| t.red())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_results_encode_as_json() {
        let mut results = ImportResults {
            books_created: 2,
            ..Default::default()
        };
        results.record_failure(3, "no title", Some("(blank)"));
        let json = results_json(&results).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["books_created"], 2);
        assert_eq!(value["failures"][0]["row"], 3);
    }
}
