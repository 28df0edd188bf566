//! End-to-end pipeline tests: declaration file → resolution → catalog on
//! disk, across two generations.

use std::fs;
use std::path::Path;

use mvnpin::artifact::Artifact;
use mvnpin::catalog::delta::ModificationKind;
use mvnpin::catalog::{Catalog, INDEX_FILE};
use mvnpin::config::Config;
use mvnpin::manifest::Manifest;
use mvnpin::reporter::NullProgress;
use mvnpin::resolver::TableResolver;
use mvnpin::scm::FsScm;
use mvnpin::updater::update_catalog;
use mvnpin::visibility::StrictDepsVisibility;
use tempfile::TempDir;

const DECLARATION: &str = "\
GUAVA = \"31.0-jre\"
SLF4J = \"1.7.36\"
BOMS = []
DEPENDENCIES = [
    \"com.google.guava:guava:${GUAVA}\",
    \"org.slf4j:slf4j-api:${SLF4J}\",
]
";

fn resolver_for(manifest: &Manifest) -> TableResolver {
    let mut resolver = TableResolver::new();
    for declared in &manifest.dependencies {
        let requested = manifest.substituted(declared).unwrap();
        let file = format!("/cache/{}.jar", requested.artifact_id);
        resolver.insert(requested, file);
    }
    resolver.insert_transitive(
        Artifact::from_coordinate("com.google.guava:failureaccess:1.0.1").unwrap(),
        "/cache/failureaccess.jar",
    );
    resolver
}

fn run_and_save(dir: &Path, declaration: &str, strict: bool) -> Catalog {
    let manifest = Manifest::parse_str(declaration).unwrap();
    let resolver = resolver_for(&manifest);
    let mut catalog = Catalog::load(dir, vec![]).unwrap();
    let strategy = StrictDepsVisibility::new(strict);
    let rdeps = |name: &str| {
        if name == "com_google_guava_failureaccess" {
            vec!["com_google_guava_guava".to_string()]
        } else {
            Vec::new()
        }
    };
    update_catalog(&mut catalog, &manifest, &resolver, &rdeps, &strategy, false).unwrap();
    let config = Config::default();
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
    catalog
}

#[test]
fn first_generation_pins_everything() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("pinned");
    run_and_save(&dir, DECLARATION, true);

    let catalog = Catalog::load(&dir, vec![]).unwrap();
    assert_eq!(catalog.len(), 3);
    let pulled = catalog.get("com_google_guava_failureaccess").unwrap();
    assert!(pulled.is_transitive_only());
    assert_eq!(pulled.visibility, vec!["@com_google_guava_guava//:__subpackages__"]);
    assert!(catalog.get("com_google_guava_guava").unwrap().visibility.is_empty());
    assert!(dir.join(INDEX_FILE).exists());
    assert!(dir.join("com_google.bzl").exists());
    assert!(dir.join("org_slf4j.bzl").exists());
}

#[test]
fn version_bump_produces_single_version_update() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("pinned");
    run_and_save(&dir, DECLARATION, false);

    let bumped = DECLARATION.replace("1.7.36", "1.7.36-custom");
    let manifest = Manifest::parse_str(&bumped).unwrap();
    let resolver = resolver_for(&manifest);
    let mut catalog = Catalog::load(&dir, vec![]).unwrap();
    let strategy = StrictDepsVisibility::new(false);
    let rdeps = |_: &str| Vec::new();
    let outcome =
        update_catalog(&mut catalog, &manifest, &resolver, &rdeps, &strategy, false).unwrap();

    let changed: Vec<_> = outcome
        .modifications
        .iter()
        .filter(|m| m.kind != ModificationKind::VersionUpdate)
        .collect();
    assert!(changed.is_empty(), "unexpected non-version changes: {changed:?}");
    assert_eq!(outcome.modifications.len(), 1);
    assert_eq!(outcome.modifications[0].name, "org_slf4j_slf4j_api");
    assert_eq!(outcome.modifications[0].fields, vec!["artifact"]);
}

#[test]
fn second_generation_removes_dropped_groups() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("pinned");
    run_and_save(&dir, DECLARATION, false);
    assert!(dir.join("org_slf4j.bzl").exists());

    let without_slf4j = "\
GUAVA = \"31.0-jre\"
BOMS = []
DEPENDENCIES = [\"com.google.guava:guava:${GUAVA}\"]
";
    run_and_save(&dir, without_slf4j, false);
    assert!(!dir.join("org_slf4j.bzl").exists());
    let index = fs::read_to_string(dir.join(INDEX_FILE)).unwrap();
    assert!(!index.contains("org_slf4j"));

    let catalog = Catalog::load(&dir, vec![]).unwrap();
    assert!(catalog.get("org_slf4j_slf4j_api").is_none());
}

#[test]
fn saving_twice_does_not_rewrite_unchanged_files() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("pinned");
    run_and_save(&dir, DECLARATION, false);
    let before = fs::metadata(dir.join("com_google.bzl")).unwrap().modified().unwrap();
    run_and_save(&dir, DECLARATION, false);
    let after = fs::metadata(dir.join("com_google.bzl")).unwrap().modified().unwrap();
    assert_eq!(before, after);
}
