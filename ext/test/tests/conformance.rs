//! Conformance tests that run YAML fixtures against routeweave
//!
//! Run with: cargo test -p routeweave-test --test conformance --features fixtures

#![cfg(feature = "fixtures")]

use routeweave::{Registry, RegistryBuilder};
use routeweave_test::fixture::Fixture;
use std::fs;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

fn registry() -> Registry {
    routeweave_test::register(RegistryBuilder::new()).build()
}

/// Load and run every fixture in one YAML file.
fn run_fixture_file(name: &str) {
    let path = fixtures_dir().join(name);
    let yaml = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));

    // Parse potentially multiple fixtures (separated by ---)
    let fixtures = Fixture::from_yaml_multi(&yaml)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()));
    assert!(!fixtures.is_empty(), "{} has no fixtures", path.display());

    let registry = registry();
    for fixture in fixtures {
        println!("  Running: {}", fixture.name);
        fixture.run_and_assert(&registry);
    }
}

#[test]
fn test_patterns() {
    run_fixture_file("01_patterns.yaml");
}

#[test]
fn test_composition() {
    run_fixture_file("02_composition.yaml");
}

#[test]
fn test_redirects() {
    run_fixture_file("03_redirects.yaml");
}

#[test]
fn test_matchers() {
    run_fixture_file("04_matchers.yaml");
}

#[test]
fn test_resolution() {
    run_fixture_file("05_resolution.yaml");
}

#[test]
fn test_every_fixture_file_is_covered() {
    let mut files: Vec<String> = fs::read_dir(fixtures_dir())
        .expect("read fixtures dir")
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".yaml") || name.ends_with(".yml"))
        .collect();
    files.sort();
    assert_eq!(
        files,
        [
            "01_patterns.yaml",
            "02_composition.yaml",
            "03_redirects.yaml",
            "04_matchers.yaml",
            "05_resolution.yaml",
        ]
    );
}
