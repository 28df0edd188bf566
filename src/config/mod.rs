//! Project configuration (`mvnpin.toml`).
//!
//! Everything that is policy rather than mechanism lives here: file
//! locations, the load symbol written into generated files, the preamble, the
//! strict-visibility switch, the deep group-id prefixes that widen file
//! grouping, the upstream server identifiers, and the SCM tool.
//!
//! ```toml
//! declaration_file = "maven_deps.bzl"
//! catalog_directory = "third_party/pinned"
//! load_label = "//tools/build:maven.bzl"
//! load_symbol = "maven_import"
//! strict_visibility = true
//! deep_group_prefixes = ["com.salesforce"]
//! servers = ["central"]
//! scm = "fs"
//! ```
//!
//! Every field has a default; a missing config file yields
//! [`Config::default`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::MvnpinError;
use crate::document::LoadStatement;
use crate::scm::{FsScm, ScmWriter};

/// Tool configuration, deserialized from `mvnpin.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Path to the dependency declaration file, relative to the project root.
    pub declaration_file: PathBuf,
    /// Directory holding the pinned catalog files and index.
    pub catalog_directory: PathBuf,
    /// Label of the `.bzl` file loaded by generated catalog files.
    pub load_label: String,
    /// Macro symbol that materializes one pinned import.
    pub load_symbol: String,
    /// Comment lines written at the top of every generated file.
    pub preamble: Vec<String>,
    /// Enable the strict-deps visibility policy for transitive-only imports.
    pub strict_visibility: bool,
    /// Group-id prefixes grouped with three leading segments instead of two.
    pub deep_group_prefixes: Vec<String>,
    /// Upstream server identifiers recorded in the catalog index.
    pub servers: Vec<String>,
    /// SCM tool identifier: `fs` (supports deletion) or `fs-keep`
    /// (marks obsolete files instead of deleting them).
    pub scm: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            declaration_file: PathBuf::from("maven_deps.bzl"),
            catalog_directory: PathBuf::from("third_party/pinned"),
            load_label: "//tools/build:maven.bzl".to_string(),
            load_symbol: "maven_import".to_string(),
            preamble: vec![
                "GENERATED FILE - DO NOT EDIT".to_string(),
                String::new(),
                "Regenerate with mvnpin.".to_string(),
            ],
            strict_visibility: false,
            deep_group_prefixes: vec!["com.salesforce".to_string()],
            servers: vec!["central".to_string()],
            scm: "fs".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file, or defaults if the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| MvnpinError::Config { message: e.to_string() })
            .with_context(|| format!("cannot parse config file {}", path.display()))?;
        Ok(config)
    }

    /// The load statement written into every generated catalog file.
    #[must_use]
    pub fn load_statement(&self) -> LoadStatement {
        LoadStatement { label: self.load_label.clone(), symbols: vec![self.load_symbol.clone()] }
    }

    /// Construct the SCM writer named by the `scm` field.
    ///
    /// # Errors
    ///
    /// [`MvnpinError::Config`] for an unsupported tool identifier. Fatal at
    /// startup.
    pub fn scm_writer(&self) -> Result<Box<dyn ScmWriter>, MvnpinError> {
        match self.scm.as_str() {
            "fs" => Ok(Box::new(FsScm::new())),
            "fs-keep" => Ok(Box::new(FsScm::without_delete())),
            other => Err(MvnpinError::Config {
                message: format!("unsupported scm tool '{other}' (expected 'fs' or 'fs-keep')"),
            }),
        }
    }
}
