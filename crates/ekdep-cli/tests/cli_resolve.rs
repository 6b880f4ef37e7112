use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[allow(deprecated)]
fn ekdep_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ekdep").unwrap();
    cmd.env("EKDEP_HOME", home).env_remove("EKDEP_CACHE");
    cmd
}

fn write_package(cache: &Path, name: &str, version: &str, deps: &[(&str, &str)]) {
    let dir = cache.join(format!("{name}-{version}"));
    fs::create_dir_all(&dir).unwrap();
    let mut manifest = format!("[package]\nname = \"{name}\"\nversion = \"{version}\"\n\n[dependencies]\n");
    for (dep, ver) in deps {
        manifest.push_str(&format!("\"{dep}\" = \"{ver}\"\n"));
    }
    fs::write(dir.join("ekdep.toml"), manifest).unwrap();
}

/// A project whose config points the cache at `<tmp>/cache`.
fn setup(root_deps: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let cache = tmp.path().join("cache");
    fs::create_dir_all(&cache).unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        format!("[cache]\ndir = {:?}\n", cache.display().to_string()),
    )
    .unwrap();
    fs::create_dir_all(tmp.path().join("app")).unwrap();
    fs::write(
        tmp.path().join("app/ekdep.toml"),
        format!("[package]\nname = \"app\"\nversion = \"1.0.0-0\"\n\n[dependencies]\n{root_deps}"),
    )
    .unwrap();
    tmp
}

#[test]
fn test_resolve_without_manifest_fails() {
    let tmp = TempDir::new().unwrap();

    ekdep_cmd(tmp.path())
        .current_dir(tmp.path())
        .args(["resolve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No ekdep.toml found"));
}

#[test]
fn test_resolve_picks_highest_version() {
    let tmp = setup("\"net.tools\" = \"1.0.0-0\"\n\"log\" = \"1.1.0-0\"\n");
    let cache = tmp.path().join("cache");
    write_package(&cache, "net.tools", "1.0.0-0", &[("log", "1.2.0-3")]);
    write_package(&cache, "log", "1.1.0-0", &[]);
    write_package(&cache, "log", "1.2.0-3", &[]);

    ekdep_cmd(tmp.path())
        .current_dir(tmp.path().join("app"))
        .args(["resolve", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"log-1.2.0-3\""))
        .stdout(predicate::str::contains("\"RATIONALISATION\""));
}

#[test]
fn test_resolve_from_subdirectory() {
    let tmp = setup("");
    let nested = tmp.path().join("app/src/deep");
    fs::create_dir_all(&nested).unwrap();

    ekdep_cmd(tmp.path())
        .current_dir(&nested)
        .args(["resolve"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Resolved"));
}

#[test]
fn test_resolve_circular_dependency_fails() {
    let tmp = setup("\"a\" = \"1.0.0-0\"\n");
    let cache = tmp.path().join("cache");
    write_package(&cache, "a", "1.0.0-0", &[("b", "1.0.0-0")]);
    write_package(&cache, "b", "1.0.0-0", &[("a", "1.0.0-0")]);

    ekdep_cmd(tmp.path())
        .current_dir(tmp.path().join("app"))
        .args(["resolve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("circular dependency"));
}

#[test]
fn test_resolve_breach_fails() {
    let tmp = setup("\"z\" = \"1.0.0-0\"\n\"y\" = \"1.0.0-0\"\n");
    let cache = tmp.path().join("cache");
    write_package(&cache, "z", "1.0.0-0", &[]);
    write_package(&cache, "z", "2.0.0-0", &[]);
    write_package(&cache, "y", "1.0.0-0", &[("z", "2.0.0-0")]);

    ekdep_cmd(tmp.path())
        .current_dir(tmp.path().join("app"))
        .args(["resolve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Breach"));
}

#[test]
fn test_resolve_missing_package_fails() {
    let tmp = setup("\"ghost\" = \"1.0.0-0\"\n");

    ekdep_cmd(tmp.path())
        .current_dir(tmp.path().join("app"))
        .args(["resolve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("package not found"));
}

#[test]
fn test_cache_dir_flag_overrides_config() {
    let tmp = setup("\"log\" = \"1.1.0-0\"\n");
    let other = tmp.path().join("other-cache");
    write_package(&other, "log", "1.1.0-0", &[]);

    ekdep_cmd(tmp.path())
        .current_dir(tmp.path().join("app"))
        .args(["resolve", "--json", "--cache-dir"])
        .arg(&other)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"log-1.1.0-0\""));
}

#[test]
fn test_tree_shows_reasons() {
    let tmp = setup("\"net.tools\" = \"1.0.0-0\"\n\"log\" = \"1.2.0-3\"\n");
    let cache = tmp.path().join("cache");
    write_package(&cache, "net.tools", "1.0.0-0", &[("log", "1.1.0-0")]);
    write_package(&cache, "log", "1.1.0-0", &[]);
    write_package(&cache, "log", "1.2.0-3", &[]);

    ekdep_cmd(tmp.path())
        .current_dir(tmp.path().join("app"))
        .args(["tree"])
        .assert()
        .success()
        .stdout(predicate::str::contains("app-1.0.0-0"))
        .stdout(predicate::str::contains("└── log-1.1.0-0 (RATIONALISATION)"));

    ekdep_cmd(tmp.path())
        .current_dir(tmp.path().join("app"))
        .args(["tree", "--accepted"])
        .assert()
        .success()
        .stdout(predicate::str::contains("log-1.1.0-0").not());
}
