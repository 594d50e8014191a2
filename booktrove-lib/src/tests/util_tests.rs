use super::*;

#[test]
fn test_format_bytes() {
    assert_eq!(format_bytes(0), "0 B");
    assert_eq!(format_bytes(512), "512 B");
    assert_eq!(format_bytes(1024), "1.0 KB");
    assert_eq!(format_bytes(1536), "1.5 KB");
    assert_eq!(format_bytes(1048576), "1.0 MB");
    assert_eq!(format_bytes(5 * 1048576 / 2), "2.5 MB");
}

#[test]
fn atomic_write_creates_parents_and_replaces() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("dir").join("file.toml");

    atomic_write(&path, b"first").unwrap();
    atomic_write(&path, b"second").unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
