use std::path::PathBuf;

use booktrove_lib::settings::{
    config_dir, credentials_path, load_settings_string, save_catalog_setting, settings_path,
};
use booktrove_search::{Credentials, credential_source, save_to_file};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use super::Paths;
use crate::CliError;

pub(crate) fn run_config_show(paths: &Paths) -> Result<(), CliError> {
    log::info!("{}", "Paths".if_supports_color(Stdout, |t| t.bold()));
    log::info!("  Config dir:  {}", config_dir().display());
    log::info!("  Settings:    {}", settings_path().display());
    log::info!("  Database:    {}", paths.db.display());
    log::info!("  Covers:      {}", paths.covers.display());
    log::info!("  Preferences: {}", paths.prefs.display());
    log::info!("  Credentials: {}", credentials_path().display());
    log::info!("");

    log::info!("{}", "Settings".if_supports_color(Stdout, |t| t.bold()));
    match load_settings_string() {
        Some(s) if !s.trim().is_empty() => {
            for line in s.lines() {
                log::info!("  {line}");
            }
        }
        _ => log::info!("  {}", "(defaults)".if_supports_color(Stdout, |t| t.dimmed())),
    }
    log::info!("");

    log::info!("{}", "Credentials".if_supports_color(Stdout, |t| t.bold()));
    log::info!("  Google Books key: {}", credential_source());
    Ok(())
}

pub(crate) fn run_config_path() {
    log::info!("{}", config_dir().display());
}

pub(crate) fn run_config_set(key: &str, value: Option<PathBuf>) -> Result<(), CliError> {
    let path = settings_path();
    save_catalog_setting(&path, key, value.as_deref())?;
    match value {
        Some(v) => log::info!("{key} = {}", v.display()),
        None => log::info!("{key} cleared"),
    }
    log::info!("Saved {}", path.display());
    Ok(())
}

pub(crate) fn run_config_set_key(key: String) -> Result<(), CliError> {
    if key.trim().is_empty() {
        return Err(CliError::invalid("The API key is empty"));
    }
    let creds = Credentials {
        google_books_key: Some(key.trim().to_string()),
    };
    let path = save_to_file(&creds, &credentials_path())?;
    log::info!("Google Books key saved to {}", path.display());
    Ok(())
}
