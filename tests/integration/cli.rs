//! CLI tests driving the `mvnpin` binary against on-disk project trees.

use assert_cmd::Command;
use mvnpin::artifact::Artifact;
use mvnpin::catalog::{Catalog, PinnedImport};
use mvnpin::config::Config;
use mvnpin::reporter::NullProgress;
use mvnpin::scm::FsScm;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const DECLARATION: &str = "\
GUAVA = \"31.0-jre\"
BOMS = []
DEPENDENCIES = [
    \"com.google.guava:guava:${GUAVA}\",
    \"org.slf4j:slf4j-api:1.7.36\",
]
";

fn mvnpin() -> Command {
    Command::cargo_bin("mvnpin").unwrap()
}

/// Write a catalog with the given imports under `dir` using the default
/// load statement and preamble.
fn write_catalog(dir: &Path, imports: Vec<PinnedImport>) {
    let config = Config::default();
    let mut catalog = Catalog::new(dir, config.deep_group_prefixes.clone());
    catalog.replace_content(imports, false).unwrap();
    let mut scm = FsScm::new();
    catalog
        .save(
            &config.servers,
            &config.load_statement(),
            &config.preamble,
            &mut NullProgress,
            &mut scm,
        )
        .unwrap();
}

fn import(name: &str, coordinate: &str) -> PinnedImport {
    PinnedImport::new(name, Artifact::from_coordinate(coordinate).unwrap())
}

fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("maven_deps.bzl"), DECLARATION).unwrap();
    write_catalog(
        &tmp.path().join("third_party").join("pinned"),
        vec![
            import("com_google_guava_guava", "com.google.guava:guava:31.0-jre"),
            import("org_slf4j_slf4j_api", "org.slf4j:slf4j-api:1.7.36"),
        ],
    );
    tmp
}

#[test]
fn check_accepts_a_generated_tree() {
    let tmp = project();
    mvnpin()
        .current_dir(tmp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("declaration file ok"))
        .stdout(predicate::str::contains("catalog ok: 2 pinned imports"));
}

#[test]
fn check_warns_when_declaration_is_missing() {
    let tmp = TempDir::new().unwrap();
    mvnpin()
        .current_dir(tmp.path())
        .arg("check")
        .assert()
        .success()
        .stderr(predicate::str::contains("no declaration file"))
        .stdout(predicate::str::contains("catalog ok: 0 pinned imports"));
}

#[test]
fn check_fails_on_malformed_catalog_file() {
    let tmp = project();
    let group_file = tmp.path().join("third_party").join("pinned").join("com_google.bzl");
    fs::write(&group_file, "this is ( not a catalog\n").unwrap();
    mvnpin()
        .current_dir(tmp.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("com_google.bzl"));
}

#[test]
fn check_flags_hand_edited_catalog_files() {
    let tmp = project();
    let group_file = tmp.path().join("third_party").join("pinned").join("com_google.bzl");
    // Still valid grammar, but not the printer's formatting.
    fs::write(
        &group_file,
        "load(\"//tools/build:maven.bzl\", \"maven_import\")\nmaven_import(name = \"com_google_guava_guava\", artifact = \"com.google.guava:guava:31.0-jre\")\n",
    )
    .unwrap();
    mvnpin()
        .current_dir(tmp.path())
        .arg("check")
        .assert()
        .success()
        .stderr(predicate::str::contains("was not produced by this tool"));
}

#[test]
fn list_prints_imports_with_coordinates() {
    let tmp = project();
    mvnpin()
        .current_dir(tmp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "com_google_guava_guava com.google.guava:guava:31.0-jre",
        ))
        .stdout(predicate::str::contains("org_slf4j_slf4j_api org.slf4j:slf4j-api:1.7.36"));
}

#[test]
fn list_reports_empty_catalog() {
    let tmp = TempDir::new().unwrap();
    mvnpin()
        .current_dir(tmp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("catalog is empty"));
}

#[test]
fn diff_reports_version_updates() {
    let tmp = project();
    write_catalog(
        &tmp.path().join("next"),
        vec![
            import("com_google_guava_guava", "com.google.guava:guava:31.0-jre"),
            import("org_slf4j_slf4j_api", "org.slf4j:slf4j-api:1.7.36-custom"),
        ],
    );
    mvnpin()
        .current_dir(tmp.path())
        .args(["diff", "next"])
        .assert()
        .success()
        .stdout(predicate::str::contains("org_slf4j_slf4j_api"))
        .stdout(predicate::str::contains("1 change(s)"));
}

#[test]
fn diff_against_identical_catalog_is_quiet() {
    let tmp = project();
    mvnpin()
        .current_dir(tmp.path())
        .args(["diff", "third_party/pinned"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no changes"));
}

#[test]
fn config_file_relocates_the_catalog() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("mvnpin.toml"), "catalog_directory = \"pinned\"\n").unwrap();
    write_catalog(
        &tmp.path().join("pinned"),
        vec![import("com_h2_h2", "com.h2:h2:2.1.0")],
    );
    mvnpin()
        .current_dir(tmp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("com_h2_h2 com.h2:h2:2.1.0"));
}

#[test]
fn unknown_config_field_is_fatal() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("mvnpin.toml"), "no_such_option = 1\n").unwrap();
    mvnpin()
        .current_dir(tmp.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("mvnpin.toml"));
}
