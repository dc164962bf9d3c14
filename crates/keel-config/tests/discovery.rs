//! Tests for config file discovery and loading

use keel_config::{ConfigDiscovery, Format, Packages, Platform};
use std::fs;
use tempfile::TempDir;

#[test]
fn discovers_keel_toml() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("keel.toml"),
        r#"
[build]
bundle = true
platform = "node"
packages = "external"
entry_points = ["src/main.ts", "src/worker.ts"]
"#,
    )
    .unwrap();

    let discovery = ConfigDiscovery::new(dir.path());
    let found = discovery.find().unwrap();
    assert_eq!(found.file_name().unwrap(), "keel.toml");

    let config = discovery.load().unwrap();
    assert!(config.build.bundle());
    assert_eq!(config.build.platform(), Platform::Node);
    assert_eq!(config.build.packages(), Packages::External);
    assert_eq!(config.build.entry_points, vec!["src/main.ts", "src/worker.ts"]);
}

#[test]
fn discovers_keel_json() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("keel.json"),
        r#"{
            "build": { "format": "cjs", "define": { "DEBUG": "true" } },
            "transform": { "loader": "tsx" }
        }"#,
    )
    .unwrap();

    let config = ConfigDiscovery::new(dir.path()).load().unwrap();
    assert_eq!(config.build.format(), Format::Cjs);
    assert_eq!(config.build.define["DEBUG"], "true");
    assert_eq!(config.transform.loader(), keel_config::Loader::Tsx);
}

#[test]
fn invalid_enum_in_file_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("keel.toml"),
        r#"
[build]
platform = "wasm"
"#,
    )
    .unwrap();

    let err = ConfigDiscovery::new(dir.path()).load().unwrap_err();
    let hint = err.hint().unwrap_or_default();
    assert!(hint.contains("wasm"), "unexpected hint: {hint}");
}

#[test]
fn unset_options_stay_unset_after_loading() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("keel.toml"), "[build]\nminify_syntax = true\n").unwrap();

    let config = ConfigDiscovery::new(dir.path()).load().unwrap();
    assert_eq!(config.build.explicit_options(), vec!["minify_syntax"]);
    assert!(!config.build.is_set("platform").unwrap());
}
