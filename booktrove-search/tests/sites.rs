use booktrove_lib::Preferences;
use booktrove_search::{EngineId, SiteList, SiteType, enabled_pref_key, order_pref_key};

const CURRENT: &str = "2,8,1,4,16,128,64,256,32";
const PERSISTED: &str = "1,2,4,16,64,128,256,512";

#[test]
fn reorder_before_load_omits_new_sites() {
    let list = SiteList::new(SiteType::Data);
    assert!(!list.is_loaded());
    assert_eq!(list.reorder(CURRENT, PERSISTED), "1,2,16,64,128,256");
}

#[test]
fn reorder_after_load_appends_new_sites() {
    let mut list = SiteList::new(SiteType::Data);
    list.load_prefs(&Preferences::new());
    assert!(list.is_loaded());
    assert_eq!(list.reorder(CURRENT, PERSISTED), "1,2,16,64,128,256,8,32");
}

#[test]
fn retired_site_is_never_registered() {
    for site_type in SiteType::ALL {
        let list = SiteList::new(site_type);
        assert!(!list.contains(EngineId::LibraryThing));
    }
    let data = SiteList::new(SiteType::Data);
    assert_eq!(data.sites().len(), 8);
}

#[test]
fn defaults_enable_the_international_sites() {
    let data = SiteList::new(SiteType::Data);
    let enabled: Vec<EngineId> = data.enabled().map(|s| s.engine).collect();
    assert_eq!(
        enabled,
        vec![
            EngineId::GoogleBooks,
            EngineId::Amazon,
            EngineId::Goodreads,
            EngineId::Isfdb,
            EngineId::OpenLibrary
        ]
    );
    let covers = SiteList::new(SiteType::Covers);
    assert_eq!(covers.get(EngineId::KbNl).map(|s| s.enabled), Some(false));
}

#[test]
fn load_applies_stored_order_and_flags() {
    let mut prefs = Preferences::new();
    prefs.set_str(order_pref_key(SiteType::Data), "32,16,4,1");
    prefs.set_bool(enabled_pref_key(EngineId::Amazon, SiteType::Data), false);
    prefs.set_bool(enabled_pref_key(EngineId::KbNl, SiteType::Data), true);

    let mut list = SiteList::new(SiteType::Data);
    let needs_save = list.load_prefs(&prefs);
    assert!(needs_save, "sites missing from the stored order were appended");
    assert_eq!(list.order_string(), "32,16,1,2,8,128,256,64");
    assert!(!list.get(EngineId::Amazon).unwrap().enabled);
    assert!(list.get(EngineId::KbNl).unwrap().enabled);
}

#[test]
fn save_then_load_is_stable() {
    let mut list = SiteList::new(SiteType::Covers);
    list.set_order("32,16");
    list.set_enabled(EngineId::GoogleBooks, false);
    let mut prefs = Preferences::new();
    list.save_prefs(&mut prefs);
    assert_eq!(prefs.get_str("search.siteOrder.covers"), Some("32,16,2,1,64"));
    assert!(!prefs.get_bool("search.site.googlebooks.covers.enabled", true));

    let mut reloaded = SiteList::new(SiteType::Covers);
    assert!(!reloaded.load_prefs(&prefs));
    assert_eq!(reloaded.order_string(), list.order_string());
    assert_eq!(reloaded.sites(), list.sites());
}

#[test]
fn set_order_ignores_unregistered_ids() {
    let mut list = SiteList::new(SiteType::AltEditions);
    assert_eq!(list.set_order("1,32,999"), "32,16");
}

#[test]
fn reset_restores_defaults_but_stays_loaded() {
    let mut list = SiteList::new(SiteType::Data);
    list.load_prefs(&Preferences::new());
    list.set_order("256");
    list.set_enabled(EngineId::Isfdb, false);
    list.reset();
    assert!(list.is_loaded());
    assert_eq!(list.order_string(), "1,2,8,16,128,256,64,32");
    assert!(list.get(EngineId::Isfdb).unwrap().enabled);
}

#[test]
fn reliability_order_only_lists_enabled_sites() {
    let mut list = SiteList::new(SiteType::Data);
    list.set_enabled(EngineId::StripInfo, true);
    list.set_enabled(EngineId::Goodreads, false);
    assert_eq!(
        list.by_reliability(),
        vec![
            EngineId::Isfdb,
            EngineId::StripInfo,
            EngineId::Amazon,
            EngineId::GoogleBooks,
            EngineId::OpenLibrary
        ]
    );
}
