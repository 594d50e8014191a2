//! Per-purpose lists of search sites: which are enabled and in what order.
//!
//! A list is built in two phases. [`SiteList::new`] registers the defaults
//! for its [`SiteType`]; [`SiteList::load_prefs`] then applies the user's
//! stored flags and order and marks the list as loaded. Whether the list
//! is loaded changes how [`SiteList::reorder`] treats sites missing from a
//! stored order.

use std::fmt;
use std::str::FromStr;

use booktrove_lib::Preferences;

use crate::engine::EngineId;

/// What a list of sites is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteType {
    /// Book details.
    Data,
    Covers,
    /// Other editions of the same work.
    AltEditions,
}

impl SiteType {
    pub const ALL: [SiteType; 3] = [SiteType::Data, SiteType::Covers, SiteType::AltEditions];

    pub fn key(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Covers => "covers",
            Self::AltEditions => "alted",
        }
    }

    /// Sites registered for this purpose, in default order, with their
    /// default enabled flag.
    fn defaults(self) -> &'static [(EngineId, bool)] {
        match self {
            Self::Data => &[
                (EngineId::GoogleBooks, true),
                (EngineId::Amazon, true),
                (EngineId::Goodreads, true),
                (EngineId::Isfdb, true),
                (EngineId::StripInfo, false),
                (EngineId::LastDodo, false),
                (EngineId::KbNl, false),
                (EngineId::OpenLibrary, true),
            ],
            Self::Covers => &[
                (EngineId::Amazon, true),
                (EngineId::GoogleBooks, true),
                (EngineId::Isfdb, true),
                (EngineId::KbNl, false),
                (EngineId::OpenLibrary, true),
            ],
            Self::AltEditions => &[(EngineId::Isfdb, true), (EngineId::OpenLibrary, true)],
        }
    }
}

impl fmt::Display for SiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SiteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "data" => Ok(Self::Data),
            "covers" => Ok(Self::Covers),
            "alted" | "alt-editions" | "editions" => Ok(Self::AltEditions),
            other => Err(format!("unknown site type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    pub engine: EngineId,
    pub site_type: SiteType,
    pub enabled: bool,
}

/// `search.siteOrder.<type>`
pub fn order_pref_key(site_type: SiteType) -> String {
    format!("search.siteOrder.{}", site_type.key())
}

/// `search.site.<engine>.<type>.enabled`
pub fn enabled_pref_key(engine: EngineId, site_type: SiteType) -> String {
    format!("search.site.{}.{}.enabled", engine.key(), site_type.key())
}

#[derive(Debug, Clone)]
pub struct SiteList {
    site_type: SiteType,
    sites: Vec<Site>,
    loaded: bool,
}

impl SiteList {
    /// The default sites for `site_type`. Preferences are not applied.
    pub fn new(site_type: SiteType) -> Self {
        let sites = site_type
            .defaults()
            .iter()
            .map(|&(engine, enabled)| Site {
                engine,
                site_type,
                enabled,
            })
            .collect();
        Self {
            site_type,
            sites,
            loaded: false,
        }
    }

    pub fn site_type(&self) -> SiteType {
        self.site_type
    }

    /// All registered sites in current order.
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Enabled sites in current order.
    pub fn enabled(&self) -> impl Iterator<Item = &Site> {
        self.sites.iter().filter(|s| s.enabled)
    }

    pub fn get(&self, engine: EngineId) -> Option<&Site> {
        self.sites.iter().find(|s| s.engine == engine)
    }

    pub fn contains(&self, engine: EngineId) -> bool {
        self.get(engine).is_some()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Returns `false` if `engine` is not registered in this list.
    pub fn set_enabled(&mut self, engine: EngineId, enabled: bool) -> bool {
        match self.sites.iter_mut().find(|s| s.engine == engine) {
            Some(site) => {
                site.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// The current order as comma-separated numeric ids.
    pub fn order_string(&self) -> String {
        join_ids(self.sites.iter().map(|s| s.engine))
    }

    /// Merge a stored order into `current`.
    ///
    /// Ids that are unknown, or not registered in this list, are dropped from
    /// both strings. The stored ids keep their stored order. Sites in
    /// `current` but missing from `persisted` are appended in `current` order
    /// only once [`load_prefs`](Self::load_prefs) has run; before that they
    /// are left out of the result.
    pub fn reorder(&self, current: &str, persisted: &str) -> String {
        let known: Vec<EngineId> = self.parse_registered(current);
        let mut out: Vec<EngineId> = Vec::with_capacity(known.len());
        for id in self.parse_registered(persisted) {
            if known.contains(&id) && !out.contains(&id) {
                out.push(id);
            }
        }
        if self.loaded {
            for &id in &known {
                if !out.contains(&id) {
                    out.push(id);
                }
            }
        }
        join_ids(out)
    }

    /// Put the sites named in `order` first, in that order. Sites not named
    /// keep their relative order after them. Returns the resulting order.
    pub fn set_order(&mut self, order: &str) -> String {
        let wanted = self.parse_registered(order);
        self.apply_order(&wanted);
        self.order_string()
    }

    /// Apply stored enabled flags and order, and mark the list loaded.
    ///
    /// Returns `true` when the stored order differs from the merged one
    /// (sites were added or retired since it was saved) and should be saved
    /// again.
    pub fn load_prefs(&mut self, prefs: &Preferences) -> bool {
        self.loaded = true;
        for site in &mut self.sites {
            let key = enabled_pref_key(site.engine, self.site_type);
            site.enabled = prefs.get_bool(&key, site.enabled);
        }

        let Some(stored) = prefs.get_str(&order_pref_key(self.site_type)) else {
            return false;
        };
        let merged = self.reorder(&self.order_string(), stored);
        let ids = self.parse_registered(&merged);
        self.apply_order(&ids);
        log::debug!("Site order for {}: {merged}", self.site_type);
        merged != stored.replace(' ', "")
    }

    pub fn save_prefs(&self, prefs: &mut Preferences) {
        prefs.set_str(order_pref_key(self.site_type), self.order_string());
        for site in &self.sites {
            prefs.set_bool(enabled_pref_key(site.engine, self.site_type), site.enabled);
        }
    }

    /// Back to the default order and flags. The loaded state is kept.
    pub fn reset(&mut self) {
        let loaded = self.loaded;
        *self = Self::new(self.site_type);
        self.loaded = loaded;
    }

    /// Enabled sites, most reliable first.
    pub fn by_reliability(&self) -> Vec<EngineId> {
        EngineId::DATA_RELIABILITY_ORDER
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(|s| s.enabled))
            .collect()
    }

    fn apply_order(&mut self, ids: &[EngineId]) {
        let rank = |engine: EngineId| ids.iter().position(|&id| id == engine).unwrap_or(usize::MAX);
        // Stable, so unnamed sites keep their relative order.
        self.sites.sort_by_key(|s| rank(s.engine));
    }

    /// Registered ids in `s`, in order. Anything else is skipped.
    fn parse_registered(&self, s: &str) -> Vec<EngineId> {
        s.split(',')
            .filter_map(|part| part.trim().parse::<u32>().ok())
            .filter_map(EngineId::from_id)
            .filter(|id| self.contains(*id))
            .collect()
    }
}

fn join_ids(ids: impl IntoIterator<Item = EngineId>) -> String {
    ids.into_iter()
        .map(|id| id.id().to_string())
        .collect::<Vec<_>>()
        .join(",")
}
