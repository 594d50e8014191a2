use super::*;
use tempfile::TempDir;

#[test]
fn missing_settings_file_gives_defaults() {
    let tmp = TempDir::new().unwrap();
    let settings = Settings::load_from(&tmp.path().join("settings.toml")).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn resolve_paths_prefers_override_then_settings() {
    let settings = Settings {
        catalog: CatalogSettings {
            db_path: Some(PathBuf::from("/books/catalog.db")),
            covers_dir: None,
        },
    };

    assert_eq!(
        settings.resolve_db_path(Some(PathBuf::from("/tmp/other.db"))),
        PathBuf::from("/tmp/other.db")
    );
    assert_eq!(
        settings.resolve_db_path(None),
        PathBuf::from("/books/catalog.db")
    );
    assert!(settings.resolve_covers_dir(None).ends_with("booktrove/covers"));
}

#[test]
fn save_catalog_setting_preserves_other_sections() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("settings.toml");
    std::fs::write(&path, "[ui]\ntheme = \"dark\"\n").unwrap();

    save_catalog_setting(&path, "db_path", Some(Path::new("/data/books.db"))).unwrap();
    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(
        settings.catalog.db_path,
        Some(PathBuf::from("/data/books.db"))
    );
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("theme = \"dark\""));

    save_catalog_setting(&path, "db_path", None).unwrap();
    assert_eq!(Settings::load_from(&path).unwrap().catalog.db_path, None);
}

#[test]
fn unknown_catalog_key_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("settings.toml");
    assert!(matches!(
        save_catalog_setting(&path, "colour", None),
        Err(ConfigError::Invalid(_))
    ));
    assert!(!path.exists());
}
