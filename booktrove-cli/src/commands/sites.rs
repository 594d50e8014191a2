use std::path::Path;

use booktrove_lib::Preferences;
use booktrove_search::{EngineId, SiteList, SiteType};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use super::Paths;
use crate::CliError;

/// Load the site list for `site_type` from `prefs`, saving the preferences
/// back when the stored order was out of date.
pub(crate) fn load_site_list(
    site_type: SiteType,
    prefs: &mut Preferences,
    prefs_path: &Path,
) -> Result<SiteList, CliError> {
    let mut list = SiteList::new(site_type);
    if list.load_prefs(prefs) {
        log::debug!("Updating stored {site_type} site order");
        list.save_prefs(prefs);
        prefs.save(prefs_path)?;
    }
    Ok(list)
}

fn not_a_site(id: EngineId, site_type: SiteType) -> CliError {
    if id.is_retired() {
        CliError::invalid(format!("{id} is no longer supported"))
    } else {
        CliError::invalid(format!("{id} is not a {site_type} site"))
    }
}

fn types_or_all(site_type: Option<SiteType>) -> Vec<SiteType> {
    site_type.map_or_else(|| SiteType::ALL.to_vec(), |t| vec![t])
}

pub(crate) fn run_sites_list(paths: &Paths, site_type: Option<SiteType>) -> Result<(), CliError> {
    let mut prefs = paths.load_prefs()?;
    for site_type in types_or_all(site_type) {
        let list = load_site_list(site_type, &mut prefs, &paths.prefs)?;
        log::info!("{}", site_type.if_supports_color(Stdout, |t| t.bold()));
        for (pos, site) in list.sites().iter().enumerate() {
            let mark = if site.enabled {
                "[x]".if_supports_color(Stdout, |t| t.green()).to_string()
            } else {
                "[ ]".to_string()
            };
            let note = if site.engine.has_engine() {
                String::new()
            } else {
                format!(" {}", "(not searchable)".if_supports_color(Stdout, |t| t.dimmed()))
            };
            log::info!(
                "  {}. {mark} {:<18} {:<12} {}{note}",
                pos + 1,
                site.engine.name(),
                site.engine.key(),
                site.engine.site_url().if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
    }
    Ok(())
}

pub(crate) fn run_sites_order(
    paths: &Paths,
    site_type: SiteType,
    sites: Vec<EngineId>,
) -> Result<(), CliError> {
    let mut prefs = paths.load_prefs()?;
    let mut list = load_site_list(site_type, &mut prefs, &paths.prefs)?;
    for id in &sites {
        if !list.contains(*id) {
            return Err(not_a_site(*id, site_type));
        }
    }
    let order: Vec<String> = sites.iter().map(|id| id.id().to_string()).collect();
    list.set_order(&order.join(","));
    list.save_prefs(&mut prefs);
    prefs.save(&paths.prefs)?;

    let names: Vec<&str> = list.sites().iter().map(|s| s.engine.name()).collect();
    log::info!("{site_type} order: {}", names.join(", "));
    Ok(())
}

pub(crate) fn run_sites_enable(
    paths: &Paths,
    site: EngineId,
    site_type: SiteType,
    enabled: bool,
) -> Result<(), CliError> {
    let mut prefs = paths.load_prefs()?;
    let mut list = load_site_list(site_type, &mut prefs, &paths.prefs)?;
    if !list.set_enabled(site, enabled) {
        return Err(not_a_site(site, site_type));
    }
    list.save_prefs(&mut prefs);
    prefs.save(&paths.prefs)?;
    log::info!(
        "{site} {} for {site_type}",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

pub(crate) fn run_sites_reset(paths: &Paths, site_type: Option<SiteType>) -> Result<(), CliError> {
    let mut prefs = paths.load_prefs()?;
    for site_type in types_or_all(site_type) {
        let mut list = load_site_list(site_type, &mut prefs, &paths.prefs)?;
        list.reset();
        list.save_prefs(&mut prefs);
        log::info!("{site_type}: {}", list.order_string());
    }
    prefs.save(&paths.prefs)?;
    Ok(())
}
