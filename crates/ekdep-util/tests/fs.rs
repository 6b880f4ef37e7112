use ekdep_util::fs::{expand_home, find_ancestor_with};
use tempfile::TempDir;

#[test]
fn test_find_ancestor_with_direct() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("ekdep.toml"), "").unwrap();
    let result = find_ancestor_with(tmp.path(), "ekdep.toml");
    assert_eq!(result, Some(tmp.path().to_path_buf()));
}

#[test]
fn test_find_ancestor_with_nested() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("ekdep.toml"), "").unwrap();
    let nested = tmp.path().join("a").join("b").join("c");
    std::fs::create_dir_all(&nested).unwrap();
    let result = find_ancestor_with(&nested, "ekdep.toml");
    assert_eq!(result, Some(tmp.path().to_path_buf()));
}

#[test]
fn test_find_ancestor_with_not_found() {
    let tmp = TempDir::new().unwrap();
    let result = find_ancestor_with(tmp.path(), "NonExistent.file");
    assert_eq!(result, None);
}

#[test]
fn test_expand_home_leaves_plain_paths() {
    assert_eq!(
        expand_home("/var/cache/ekdep"),
        std::path::PathBuf::from("/var/cache/ekdep")
    );
}

#[test]
fn test_expand_home_replaces_tilde() {
    let expanded = expand_home("~/.ekdep/cache");
    assert!(expanded.ends_with(".ekdep/cache"), "got: {}", expanded.display());
    assert!(!expanded.to_string_lossy().starts_with('~'));
}
