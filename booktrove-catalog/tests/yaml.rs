use booktrove_catalog::{BookSort, BooklistGroup, YamlError, load_styles};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_yaml(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn load_style_from_yaml() {
    let tmp = TempDir::new().unwrap();
    write_yaml(
        tmp.path(),
        "by-language.yaml",
        r#"
uuid: 0b1f6b8e-3f4e-4d2a-9c57-3d1a2b4c5d6e
name: "By language"
preferred: true
groups:
  - language
  - author
sort: date_added
show_covers: false
builtin: true
"#,
    );

    let styles = load_styles(tmp.path()).unwrap();
    assert_eq!(styles.len(), 1);
    let style = &styles[0];
    assert_eq!(style.name, "By language");
    assert_eq!(
        style.groups,
        vec![BooklistGroup::Language, BooklistGroup::Author]
    );
    assert_eq!(style.sort, BookSort::DateAdded);
    assert!(!style.show_covers);
    assert!(!style.builtin, "styles from disk are never builtin");
}

#[test]
fn style_defaults_apply() {
    let tmp = TempDir::new().unwrap();
    write_yaml(
        tmp.path(),
        "minimal.yml",
        "uuid: abc\nname: Minimal\n",
    );

    let styles = load_styles(tmp.path()).unwrap();
    assert_eq!(styles[0].sort, BookSort::TitleAsc);
    assert!(styles[0].show_covers);
    assert!(styles[0].groups.is_empty());
    assert!(!styles[0].preferred);
}

#[test]
fn styles_sorted_by_file_name_and_other_files_ignored() {
    let tmp = TempDir::new().unwrap();
    write_yaml(tmp.path(), "b.yaml", "uuid: b\nname: Second\n");
    write_yaml(tmp.path(), "a.yaml", "uuid: a\nname: First\n");
    write_yaml(tmp.path(), "notes.txt", "not yaml at all: [");

    let styles = load_styles(tmp.path()).unwrap();
    let names: Vec<_> = styles.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second"]);
}

#[test]
fn missing_dir_returns_empty() {
    let styles = load_styles(Path::new("/nonexistent/booktrove/styles")).unwrap();
    assert!(styles.is_empty());
}

#[test]
fn duplicate_uuid_is_rejected() {
    let tmp = TempDir::new().unwrap();
    write_yaml(tmp.path(), "one.yaml", "uuid: same\nname: One\n");
    write_yaml(tmp.path(), "two.yaml", "uuid: same\nname: Two\n");

    let err = load_styles(tmp.path()).unwrap_err();
    assert!(matches!(err, YamlError::DuplicateStyle { ref uuid, .. } if uuid == "same"));
}

#[test]
fn parse_error_names_the_file() {
    let tmp = TempDir::new().unwrap();
    write_yaml(tmp.path(), "broken.yaml", "name: [unclosed\n");

    let err = load_styles(tmp.path()).unwrap_err();
    match err {
        YamlError::Parse { path, .. } => assert!(path.ends_with("broken.yaml")),
        other => panic!("expected parse error, got {other:?}"),
    }
}
