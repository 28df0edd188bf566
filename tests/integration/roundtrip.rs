//! Round-trip fidelity across the document model, declaration layer, and
//! catalog files.

use mvnpin::artifact::{Artifact, Exclusion};
use mvnpin::catalog::{Catalog, parse_catalog_file};
use mvnpin::config::Config;
use mvnpin::document::printer::print_document;
use mvnpin::document::{self};
use mvnpin::manifest::Manifest;
use mvnpin::reporter::NullProgress;
use mvnpin::scm::FsScm;
use std::fs;
use tempfile::TempDir;

#[test]
fn printer_output_is_a_fixed_point_of_parse_print() {
    let text = "\
# GENERATED FILE - DO NOT EDIT
#
# Regenerate with mvnpin.

load(\"//tools/build:maven.bzl\", \"maven_import\")

maven_import(
    name = \"com_google_guava_guava\",
    artifact = \"com.google.guava:guava:31.0-jre\",
    exclusions = [\"com.google.code.findbugs:jsr305\"],
    tags = [\"transitive\"],
    visibility = [
        \"@a//:__subpackages__\",
        \"@b//:__subpackages__\",
    ],
)
";
    let doc = document::parse(text).unwrap();
    assert_eq!(print_document(&doc), text);
}

#[test]
fn declaration_with_all_sections_round_trips() {
    let text = "\
# Dependencies of the monorepo.

GUAVA = \"31.0-jre\"
NOTICE = \"\\n\".join([
    \"This file is reviewed by the build council.\",
    \"Keep the list sorted.\",
])
BOMS = [\"org.springframework:spring-framework-bom:pom:5.3.20\"]
DEPENDENCIES = [
    \"com.google.guava:guava:${GUAVA}\",
    \"org.slf4j:slf4j-api:1.7.36\",
]
";
    let manifest = Manifest::parse_str(text).unwrap();
    assert_eq!(
        manifest.notice.as_deref(),
        Some("This file is reviewed by the build council.\nKeep the list sorted.")
    );
    let printed = manifest.print();
    assert_eq!(Manifest::parse_str(&printed).unwrap(), manifest);
    // And the printer's own output is stable.
    assert_eq!(printed, Manifest::parse_str(&printed).unwrap().print());
}

#[test]
fn catalog_files_read_back_from_where_they_were_written() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("third_party").join("pinned");
    let config = Config::default();

    let mut artifact =
        Artifact::from_coordinate("com.salesforce.core:platform-api:war:sources:2.4.1").unwrap();
    artifact.exclusions.insert(Exclusion::new("*", "*"));
    artifact.optional = true;
    artifact.test_only = true;
    let mut import =
        mvnpin::catalog::PinnedImport::new("com_salesforce_core_platform_api_war_sources", artifact);
    import.add_tag("transitive");
    import.visibility = vec!["//visibility:private".to_string()];

    let mut catalog = Catalog::new(&dir, config.deep_group_prefixes.clone());
    catalog.replace_content(vec![import.clone()], false).unwrap();
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

    // The deep-prefix rule puts this group under three leading segments.
    let group_file = dir.join("com_salesforce_core.bzl");
    assert!(group_file.exists());
    let text = fs::read_to_string(&group_file).unwrap();
    let reread = parse_catalog_file(&text).unwrap();
    assert_eq!(reread, vec![import.clone()]);

    let loaded = Catalog::load(&dir, config.deep_group_prefixes).unwrap();
    assert_eq!(loaded.get(&import.name), Some(&import));
}

#[test]
fn foreign_but_well_formed_files_still_parse() {
    // Hand-written file with interior comments and packed formatting.
    let text = "\
load(\"//x:y.bzl\", \"maven_import\")
# someone's note
maven_import(name = \"g_a\", artifact = \"g:a:1.0\")
";
    let imports = parse_catalog_file(text).unwrap();
    assert_eq!(imports.len(), 1);
    assert_eq!(imports[0].artifact.coordinate(), "g:a:1.0");
}

#[test]
fn malformed_files_fail_without_partial_documents() {
    let err = document::parse("DEPS = [\n    \"a\" \"b\",\n]\n").unwrap_err();
    assert_eq!(err.line, 2);
    let rendered = format!("{err}");
    assert!(rendered.starts_with("Invalid file: "));
    assert!(rendered.contains("(2:"));
}
