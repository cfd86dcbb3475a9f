//! Conformance tests that run YAML fixtures against waypath
//!
//! Run with: cargo test -p waypath-test --test conformance
//!
//! Note: This test file requires the `fixtures` feature to be enabled.

#![cfg(feature = "fixtures")]

use std::fs;
use std::path::{Path, PathBuf};
use waypath_test::fixture::Fixture;
use waypath_test::route_fixture::RouteFixture;

/// Get the conformance directory relative to the workspace root
fn fixtures_dir() -> PathBuf {
    // The manifest dir is ext/test, we need to go up to the workspace root
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let ext_test = Path::new(manifest_dir);

    // Go up: ext/test -> ext -> workspace
    let root = ext_test
        .parent() // ext
        .and_then(|p| p.parent()) // workspace
        .expect("Could not find workspace root");

    root.join("conformance")
}

/// YAML files in a directory, sorted so failures are reproducible
fn yaml_files(dir: &Path) -> Vec<PathBuf> {
    assert!(
        dir.exists(),
        "Fixtures directory does not exist: {}",
        dir.display()
    );

    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| path.extension().is_some_and(|e| e == "yaml" || e == "yml"))
        .collect();
    files.sort();
    assert!(!files.is_empty(), "No fixtures in {}", dir.display());
    files
}

/// Load and run all pattern fixtures in a directory
fn run_fixtures_in_dir(dir: &Path) {
    for path in yaml_files(dir) {
        println!("Running fixture: {}", path.display());

        let yaml = fs::read_to_string(&path).expect("read yaml");

        // Parse potentially multiple fixtures (separated by ---)
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {}", path.display(), e);
        });

        for fixture in fixtures {
            println!("  Running: {}", fixture.name);
            fixture.run_and_assert();
        }
    }
}

/// Load and run all route table fixtures in a directory
fn run_route_fixtures_in_dir(dir: &Path) {
    for path in yaml_files(dir) {
        println!("Running fixture: {}", path.display());

        let yaml = fs::read_to_string(&path).expect("read yaml");
        let fixtures = RouteFixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {}", path.display(), e);
        });

        for fixture in fixtures {
            println!("  Running: {}", fixture.name);
            fixture.run_and_assert();
        }
    }
}

#[test]
fn test_patterns() {
    run_fixtures_in_dir(&fixtures_dir().join("01_patterns"));
}

#[test]
fn test_priority() {
    run_fixtures_in_dir(&fixtures_dir().join("02_priority"));
}

#[test]
fn test_errors() {
    run_fixtures_in_dir(&fixtures_dir().join("03_errors"));
}

#[test]
fn test_routes() {
    run_route_fixtures_in_dir(&fixtures_dir().join("04_routes"));
}
