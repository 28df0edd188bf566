//! The dependency declaration file: the human-owned input listing what the
//! project *wants*, as opposed to the machine-owned pinned catalog recording
//! what it *got*.
//!
//! A declaration file is written in the dialect of [`crate::document`] and
//! contains, in order:
//!
//! - version variable assignments like `GUAVA = "31.0-jre"`: names are unique,
//!   insertion order is preserved for deterministic re-serialization, lookup
//!   is by name
//! - an optional multi-line `NOTICE` block (the `"\n".join` idiom)
//! - `BOMS = [...]`: imported bill-of-materials artifacts
//! - `DEPENDENCIES = [...]`: directly requested artifacts
//!
//! Artifact list entries are canonical coordinate strings whose version field
//! may reference a version variable as `${NAME}`; [`Manifest::substitute`]
//! resolves the placeholders before the coordinates are handed to the
//! external resolver.
//!
//! # Round-trip fidelity
//!
//! Re-serializing and re-parsing a manifest reproduces an identical document,
//! and for manifests produced by [`Manifest::print`] the text itself is
//! byte-identical.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::artifact::Artifact;
use crate::core::MvnpinError;
use crate::document::printer::print_document;
use crate::document::{self, Document, Expr, LoadStatement, Statement};

/// Reserved assignment name for the imported BOM list.
const BOMS: &str = "BOMS";
/// Reserved assignment name for the direct dependency list.
const DEPENDENCIES: &str = "DEPENDENCIES";
/// Reserved assignment name for the optional multi-line notice block.
const NOTICE: &str = "NOTICE";

/// A parsed dependency declaration file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    pub preamble: Vec<String>,
    pub load: Option<LoadStatement>,
    /// `(name, version)` pairs in declaration order. Names are unique.
    versions: Vec<(String, String)>,
    /// Optional multi-line notice text.
    pub notice: Option<String>,
    /// Imported BOM artifacts, in declaration order. Versions may contain
    /// `${NAME}` placeholders.
    pub boms: Vec<Artifact>,
    /// Directly requested artifacts, in declaration order. Versions may
    /// contain `${NAME}` placeholders.
    pub dependencies: Vec<Artifact>,
}

impl Manifest {
    /// Parse declaration file source text.
    ///
    /// # Errors
    ///
    /// [`MvnpinError::Parse`] for dialect violations,
    /// [`MvnpinError::InvalidDocument`] for semantic problems (duplicate
    /// variable names, call statements, non-string version values),
    /// [`MvnpinError::InvalidCoordinate`] for malformed list entries.
    pub fn parse_str(text: &str) -> Result<Self, MvnpinError> {
        let doc = document::parse(text)?;
        Self::from_document(doc)
    }

    /// Load and parse a declaration file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read declaration file {}", path.display()))?;
        let manifest = Self::parse_str(&text)
            .with_context(|| format!("cannot parse declaration file {}", path.display()))?;
        debug!(
            path = %path.display(),
            versions = manifest.versions.len(),
            boms = manifest.boms.len(),
            dependencies = manifest.dependencies.len(),
            "loaded declaration file"
        );
        Ok(manifest)
    }

    fn from_document(doc: Document) -> Result<Self, MvnpinError> {
        let mut manifest =
            Self { preamble: doc.preamble, load: doc.load, ..Self::default() };
        for statement in doc.statements {
            match statement {
                Statement::Assign { name, value } => match (name.as_str(), value) {
                    (BOMS, Expr::List(items)) => {
                        manifest.boms = parse_artifacts(&items)?;
                    }
                    (DEPENDENCIES, Expr::List(items)) => {
                        manifest.dependencies = parse_artifacts(&items)?;
                    }
                    (NOTICE, Expr::Str(text)) => manifest.notice = Some(text),
                    (BOMS | DEPENDENCIES | NOTICE, _) => {
                        return Err(MvnpinError::InvalidDocument {
                            message: format!("'{name}' has the wrong value type"),
                        });
                    }
                    (_, Expr::Str(version)) => {
                        if manifest.versions.iter().any(|(n, _)| *n == name) {
                            return Err(MvnpinError::InvalidDocument {
                                message: format!("duplicate version variable '{name}'"),
                            });
                        }
                        manifest.versions.push((name, version));
                    }
                    (_, _) => {
                        return Err(MvnpinError::InvalidDocument {
                            message: format!(
                                "unexpected assignment '{name}' in declaration file"
                            ),
                        });
                    }
                },
                Statement::Call { function, .. } => {
                    return Err(MvnpinError::InvalidDocument {
                        message: format!(
                            "unexpected call to '{function}' in declaration file"
                        ),
                    });
                }
            }
        }
        Ok(manifest)
    }

    /// Look up a version variable by name.
    #[must_use]
    pub fn version(&self, name: &str) -> Option<&str> {
        self.versions.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    /// Version variables in declaration order.
    #[must_use]
    pub fn versions(&self) -> &[(String, String)] {
        &self.versions
    }

    /// Define a version variable. Replaces the value in place if the name
    /// already exists, preserving its position.
    pub fn set_version(&mut self, name: impl Into<String>, version: impl Into<String>) {
        let name = name.into();
        let version = version.into();
        if let Some(entry) = self.versions.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = version;
        } else {
            self.versions.push((name, version));
        }
    }

    /// Replace every `${NAME}` placeholder in a version string with the
    /// variable's value.
    ///
    /// # Errors
    ///
    /// [`MvnpinError::UnknownVersionVariable`] for a placeholder with no
    /// matching variable.
    pub fn substitute(&self, version: &str) -> Result<String, MvnpinError> {
        let mut out = String::with_capacity(version.len());
        let mut rest = version;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                return Err(MvnpinError::UnknownVersionVariable {
                    name: after.to_string(),
                });
            };
            let name = &after[..end];
            match self.version(name) {
                Some(value) => out.push_str(value),
                None => {
                    return Err(MvnpinError::UnknownVersionVariable { name: name.to_string() });
                }
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// An artifact with its version placeholders resolved.
    pub fn substituted(&self, artifact: &Artifact) -> Result<Artifact, MvnpinError> {
        let mut resolved = artifact.clone();
        resolved.version = self.substitute(&artifact.version)?;
        Ok(resolved)
    }

    /// Rebuild the document tree for serialization. Sections always print in
    /// the order: version variables, notice, BOMs, dependencies.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut statements: Vec<Statement> = self
            .versions
            .iter()
            .map(|(name, version)| Statement::Assign {
                name: name.clone(),
                value: Expr::Str(version.clone()),
            })
            .collect();
        if let Some(notice) = &self.notice {
            statements.push(Statement::Assign {
                name: NOTICE.to_string(),
                value: Expr::Str(notice.clone()),
            });
        }
        statements.push(Statement::Assign {
            name: BOMS.to_string(),
            value: Expr::List(self.boms.iter().map(Artifact::coordinate).collect()),
        });
        statements.push(Statement::Assign {
            name: DEPENDENCIES.to_string(),
            value: Expr::List(self.dependencies.iter().map(Artifact::coordinate).collect()),
        });
        Document {
            preamble: self.preamble.clone(),
            load: self.load.clone(),
            statements,
        }
    }

    /// Serialize to declaration file source text.
    #[must_use]
    pub fn print(&self) -> String {
        print_document(&self.to_document())
    }
}

fn parse_artifacts(items: &[String]) -> Result<Vec<Artifact>, MvnpinError> {
    items.iter().map(|item| Artifact::from_coordinate(item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# third-party dependencies
GUAVA = \"31.0-jre\"
SLF4J = \"1.7.36\"
BOMS = [\"com.fake:bom:1.0\"]
DEPENDENCIES = [
    \"com.google.guava:guava:${GUAVA}\",
    \"org.slf4j:slf4j-api:${SLF4J}\",
]
";

    #[test]
    fn parses_sections() {
        let manifest = Manifest::parse_str(SAMPLE).unwrap();
        assert_eq!(manifest.version("GUAVA"), Some("31.0-jre"));
        assert_eq!(manifest.boms.len(), 1);
        assert_eq!(manifest.dependencies.len(), 2);
        assert_eq!(manifest.dependencies[0].version, "${GUAVA}");
    }

    #[test]
    fn preserves_version_order() {
        let manifest = Manifest::parse_str(SAMPLE).unwrap();
        let names: Vec<&str> = manifest.versions().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["GUAVA", "SLF4J"]);
    }

    #[test]
    fn substitutes_placeholders() {
        let manifest = Manifest::parse_str(SAMPLE).unwrap();
        assert_eq!(manifest.substitute("${GUAVA}").unwrap(), "31.0-jre");
        assert_eq!(manifest.substitute("${SLF4J}-custom").unwrap(), "1.7.36-custom");
        assert_eq!(manifest.substitute("2.0").unwrap(), "2.0");
    }

    #[test]
    fn unknown_placeholder_is_an_error() {
        let manifest = Manifest::parse_str(SAMPLE).unwrap();
        let err = manifest.substitute("${MISSING}").unwrap_err();
        assert!(matches!(err, MvnpinError::UnknownVersionVariable { name } if name == "MISSING"));
    }

    #[test]
    fn duplicate_version_variable_is_rejected() {
        let err = Manifest::parse_str("A = \"1\"\nA = \"2\"\n").unwrap_err();
        assert!(matches!(err, MvnpinError::InvalidDocument { .. }));
    }

    #[test]
    fn call_statement_is_rejected() {
        let err = Manifest::parse_str("maven_import(name = \"x\")\n").unwrap_err();
        assert!(matches!(err, MvnpinError::InvalidDocument { .. }));
    }

    #[test]
    fn round_trip_is_identity() {
        let manifest = Manifest::parse_str(SAMPLE).unwrap();
        let printed = manifest.print();
        let reparsed = Manifest::parse_str(&printed).unwrap();
        assert_eq!(reparsed, manifest);
        // Printer-produced text is stable byte-for-byte.
        assert_eq!(Manifest::parse_str(&printed).unwrap().print(), printed);
    }

    #[test]
    fn notice_round_trips_through_join_idiom() {
        let mut manifest = Manifest::parse_str(SAMPLE).unwrap();
        manifest.notice = Some("line one\nline two".to_string());
        let printed = manifest.print();
        assert!(printed.contains("\"\\n\".join(["));
        assert_eq!(Manifest::parse_str(&printed).unwrap(), manifest);
    }

    #[test]
    fn set_version_replaces_in_place() {
        let mut manifest = Manifest::parse_str(SAMPLE).unwrap();
        manifest.set_version("GUAVA", "32.0-jre");
        let names: Vec<&str> = manifest.versions().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["GUAVA", "SLF4J"]);
        assert_eq!(manifest.version("GUAVA"), Some("32.0-jre"));
    }
}
