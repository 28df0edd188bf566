//! The pinned catalog, the machine-owned record of every resolved import.
//!
//! The catalog is split across one dialect file per *file-group* (a bucket
//! derived from the group coordinate, see [`crate::naming::file_group`]) plus
//! an index file enumerating all groups, the catalog directory, and the
//! upstream servers consulted during resolution. Splitting keeps individual
//! files reviewable while the in-memory view stays a single collection keyed
//! by import name across all groups.
//!
//! Lifecycle per invocation: [`Catalog::load`] reads everything fresh,
//! [`Catalog::replace_content`] diffs a new generation against the current
//! one (optionally replacing it), and [`Catalog::save`] serializes each group
//! through the dialect printer and hands the text to the SCM writer
//! collaborator. The engine itself performs no direct file writes, and
//! file-groups that lost their last import are removed through the same
//! collaborator rather than left stale.

pub mod delta;

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, trace};

use crate::artifact::{Artifact, Exclusion};
use crate::core::MvnpinError;
use crate::document::printer::print_document;
use crate::document::{self, Document, Expr, LoadStatement, Statement};
use crate::naming;
use crate::reporter::ProgressReporter;
use crate::scm::ScmWriter;
use delta::Modification;

/// Tag marking an import that is present only because something else depends
/// on it, not because it was explicitly requested.
pub const TRANSITIVE_TAG: &str = "transitive";

/// File name of the catalog index within the catalog directory.
pub const INDEX_FILE: &str = "index.bzl";

const FILE_GROUPS: &str = "FILE_GROUPS";
const CATALOG_DIRECTORY: &str = "CATALOG_DIRECTORY";
const SERVERS: &str = "SERVERS";

/// One pinned entry in the catalog.
///
/// Identity for diffing purposes is the `name`; it is unique across the
/// whole catalog, not just within its file-group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedImport {
    /// Derived build target name, see [`crate::naming::to_target_name`].
    pub name: String,
    /// The resolved artifact.
    pub artifact: Artifact,
    /// Tags, insertion-ordered and unique. See [`TRANSITIVE_TAG`].
    tags: Vec<String>,
    /// Visibility labels. Empty means default/public.
    pub visibility: Vec<String>,
}

impl PinnedImport {
    #[must_use]
    pub fn new(name: impl Into<String>, artifact: Artifact) -> Self {
        Self { name: name.into(), artifact, tags: Vec::new(), visibility: Vec::new() }
    }

    /// Append a tag unless it is already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[must_use]
    pub fn is_transitive_only(&self) -> bool {
        self.has_tag(TRANSITIVE_TAG)
    }

    /// The call statement persisted for this import. Empty and default
    /// attributes are omitted.
    fn to_statement(&self, symbol: &str) -> Statement {
        let mut kwargs = vec![
            ("name".to_string(), Expr::Str(self.name.clone())),
            ("artifact".to_string(), Expr::Str(self.artifact.coordinate())),
        ];
        if !self.artifact.exclusions.is_empty() {
            kwargs.push((
                "exclusions".to_string(),
                Expr::List(self.artifact.exclusions.iter().map(ToString::to_string).collect()),
            ));
        }
        if self.artifact.optional {
            kwargs.push(("optional".to_string(), Expr::Bool(true)));
        }
        if self.artifact.test_only {
            kwargs.push(("test_only".to_string(), Expr::Bool(true)));
        }
        if !self.tags.is_empty() {
            kwargs.push(("tags".to_string(), Expr::List(self.tags.clone())));
        }
        if !self.visibility.is_empty() {
            kwargs.push(("visibility".to_string(), Expr::List(self.visibility.clone())));
        }
        Statement::Call { function: symbol.to_string(), kwargs }
    }

    fn from_statement(function: &str, kwargs: Vec<(String, Expr)>) -> Result<Self, MvnpinError> {
        let mut name = None;
        let mut coordinate = None;
        let mut exclusions = Vec::new();
        let mut optional = false;
        let mut test_only = false;
        let mut tags = Vec::new();
        let mut visibility = Vec::new();
        for (key, value) in kwargs {
            match (key.as_str(), value) {
                ("name", Expr::Str(v)) => name = Some(v),
                ("artifact", Expr::Str(v)) => coordinate = Some(v),
                ("exclusions", Expr::List(items)) => exclusions = items,
                ("optional", Expr::Bool(v)) => optional = v,
                ("test_only", Expr::Bool(v)) => test_only = v,
                ("tags", Expr::List(items)) => tags = items,
                ("visibility", Expr::List(items)) => visibility = items,
                (key, _) => {
                    return Err(MvnpinError::InvalidDocument {
                        message: format!("unsupported attribute '{key}' on '{function}'"),
                    });
                }
            }
        }
        let name = name.ok_or_else(|| MvnpinError::InvalidDocument {
            message: format!("'{function}' is missing the 'name' attribute"),
        })?;
        let coordinate = coordinate.ok_or_else(|| MvnpinError::InvalidDocument {
            message: format!("import '{name}' is missing the 'artifact' attribute"),
        })?;
        let mut artifact = Artifact::from_coordinate(&coordinate)?;
        for spec in &exclusions {
            artifact.exclusions.insert(Exclusion::from_spec(spec)?);
        }
        artifact.optional = optional;
        artifact.test_only = test_only;
        let mut import = Self::new(name, artifact);
        for tag in tags {
            import.add_tag(tag);
        }
        import.visibility = visibility;
        Ok(import)
    }
}

/// The catalog index: all known file-groups, the directory holding the
/// catalog files, and the upstream server identifiers consulted during
/// resolution. Informational, not authoritative for dependency semantics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogIndex {
    pub file_groups: Vec<String>,
    pub directory: String,
    pub servers: Vec<String>,
}

/// The in-memory pinned import collection, the single owner of all imports
/// for the duration of a run.
#[derive(Debug)]
pub struct Catalog {
    directory: PathBuf,
    deep_prefixes: Vec<String>,
    imports: BTreeMap<String, PinnedImport>,
    /// File-groups present on disk, used to remove files whose group lost
    /// its last member.
    disk_groups: BTreeSet<String>,
    servers: Vec<String>,
}

impl Catalog {
    /// An empty catalog rooted at `directory`.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, deep_prefixes: Vec<String>) -> Self {
        Self {
            directory: directory.into(),
            deep_prefixes,
            imports: BTreeMap::new(),
            disk_groups: BTreeSet::new(),
            servers: Vec::new(),
        }
    }

    /// Load the catalog from `directory`: the index file first, then every
    /// catalog file it references, assembled into one collection keyed by
    /// import name. A missing index yields an empty catalog.
    pub fn load(directory: &Path, deep_prefixes: Vec<String>) -> Result<Self> {
        let mut catalog = Self::new(directory, deep_prefixes);
        let index_path = directory.join(INDEX_FILE);
        if !index_path.exists() {
            debug!(path = %index_path.display(), "no catalog index, starting empty");
            return Ok(catalog);
        }
        let index = read_index(&index_path)?;
        catalog.servers = index.servers;
        for group in &index.file_groups {
            let path = catalog.group_path(group);
            let text = fs::read_to_string(&path)
                .with_context(|| format!("cannot read catalog file {}", path.display()))?;
            let imports = parse_catalog_file(&text)
                .with_context(|| format!("cannot parse catalog file {}", path.display()))?;
            trace!(group, imports = imports.len(), "loaded catalog file");
            for import in imports {
                if catalog.imports.contains_key(&import.name) {
                    return Err(MvnpinError::InvalidDocument {
                        message: format!("duplicate import name '{}'", import.name),
                    }
                    .into());
                }
                catalog.imports.insert(import.name.clone(), import);
            }
            catalog.disk_groups.insert(group.clone());
        }
        debug!(
            directory = %directory.display(),
            groups = catalog.disk_groups.len(),
            imports = catalog.imports.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Upstream server identifiers recorded in the index at load time.
    #[must_use]
    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PinnedImport> {
        self.imports.get(name)
    }

    pub fn imports(&self) -> impl Iterator<Item = &PinnedImport> {
        self.imports.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.imports.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Diff a new generation of imports against the current collection and,
    /// unless `dry_run` is set, adopt the new generation.
    ///
    /// Modifications come back sorted by import name. With `dry_run` the
    /// collection is left untouched (diff-only mode).
    pub fn replace_content(
        &mut self,
        new_imports: Vec<PinnedImport>,
        dry_run: bool,
    ) -> Result<Vec<Modification>, MvnpinError> {
        let mut next = BTreeMap::new();
        for import in new_imports {
            let name = import.name.clone();
            if next.insert(name.clone(), import).is_some() {
                return Err(MvnpinError::InvalidDocument {
                    message: format!("duplicate import name '{name}' in replacement set"),
                });
            }
        }
        let modifications = delta::diff(&self.imports, &next);
        debug!(modifications = modifications.len(), dry_run, "computed catalog delta");
        if !dry_run {
            self.imports = next;
        }
        Ok(modifications)
    }

    /// Serialize the collection back to disk through the SCM collaborator.
    ///
    /// Imports are regrouped by file-group; each non-empty group becomes one
    /// catalog file, groups that lost their last member are removed, and the
    /// index is regenerated from the non-empty groups. `servers` is recorded
    /// in the index; `load_statement` and `preamble` head every catalog file.
    pub fn save(
        &mut self,
        servers: &[String],
        load_statement: &LoadStatement,
        preamble: &[String],
        progress: &mut dyn ProgressReporter,
        scm: &mut dyn ScmWriter,
    ) -> Result<()> {
        let symbol = load_statement.symbols.first().ok_or_else(|| MvnpinError::Config {
            message: "load statement for catalog files names no symbols".to_string(),
        })?;

        let mut groups: BTreeMap<String, Vec<&PinnedImport>> = BTreeMap::new();
        for import in self.imports.values() {
            groups
                .entry(naming::file_group(&import.artifact.group_id, &self.deep_prefixes))
                .or_default()
                .push(import);
        }

        let stale: Vec<String> =
            self.disk_groups.iter().filter(|g| !groups.contains_key(*g)).cloned().collect();
        progress.max_hint((groups.len() + stale.len() + 1) as u64);

        for (group, imports) in &groups {
            let doc = Document {
                preamble: preamble.to_vec(),
                load: Some(load_statement.clone()),
                statements: imports.iter().map(|i| i.to_statement(symbol)).collect(),
            };
            let path = self.group_path(group);
            let changed = scm.write_file(&path, &print_document(&doc))?;
            trace!(group, changed, "wrote catalog file");
            progress.progress_by(1);
        }

        for group in &stale {
            let path = self.group_path(group);
            let deleted = scm.remove_file(&path)?;
            debug!(group, deleted, "removed empty file-group");
            progress.progress_by(1);
        }

        let index = CatalogIndex {
            file_groups: groups.keys().cloned().collect(),
            directory: self
                .directory
                .file_name()
                .map_or_else(String::new, |n| n.to_string_lossy().into_owned()),
            servers: servers.to_vec(),
        };
        scm.write_file(&self.directory.join(INDEX_FILE), &print_index(&index, preamble))?;
        progress.progress_by(1);
        progress.done();

        self.disk_groups = groups.into_keys().collect();
        self.servers = servers.to_vec();
        Ok(())
    }

    fn group_path(&self, group: &str) -> PathBuf {
        self.directory.join(format!("{group}.bzl"))
    }
}

/// Parse one catalog file into its pinned imports.
///
/// The file must carry a `load(...)` statement; every statement must be a
/// call to one of the loaded symbols.
pub fn parse_catalog_file(text: &str) -> Result<Vec<PinnedImport>, MvnpinError> {
    let doc = document::parse(text)?;
    let Some(load) = &doc.load else {
        return Err(MvnpinError::InvalidDocument {
            message: "catalog file is missing its load statement".to_string(),
        });
    };
    let mut imports = Vec::new();
    for statement in doc.statements {
        match statement {
            Statement::Call { function, kwargs } if load.symbols.contains(&function) => {
                imports.push(PinnedImport::from_statement(&function, kwargs)?);
            }
            Statement::Call { function, .. } => {
                return Err(MvnpinError::InvalidDocument {
                    message: format!("call to '{function}' which the file does not load"),
                });
            }
            Statement::Assign { name, .. } => {
                return Err(MvnpinError::InvalidDocument {
                    message: format!("unexpected assignment '{name}' in catalog file"),
                });
            }
        }
    }
    Ok(imports)
}

fn read_index(path: &Path) -> Result<CatalogIndex> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read catalog index {}", path.display()))?;
    let doc = document::parse(&text)
        .map_err(MvnpinError::from)
        .with_context(|| format!("cannot parse catalog index {}", path.display()))?;
    let mut index = CatalogIndex::default();
    for statement in doc.statements {
        match statement {
            Statement::Assign { name, value } => match (name.as_str(), value) {
                (FILE_GROUPS, Expr::List(items)) => index.file_groups = items,
                (CATALOG_DIRECTORY, Expr::Str(dir)) => index.directory = dir,
                (SERVERS, Expr::List(items)) => index.servers = items,
                (name, _) => {
                    return Err(MvnpinError::InvalidDocument {
                        message: format!("unexpected assignment '{name}' in catalog index"),
                    }
                    .into());
                }
            },
            Statement::Call { function, .. } => {
                return Err(MvnpinError::InvalidDocument {
                    message: format!("unexpected call to '{function}' in catalog index"),
                }
                .into());
            }
        }
    }
    Ok(index)
}

fn print_index(index: &CatalogIndex, preamble: &[String]) -> String {
    let doc = Document {
        preamble: preamble.to_vec(),
        load: None,
        statements: vec![
            Statement::Assign {
                name: FILE_GROUPS.to_string(),
                value: Expr::List(index.file_groups.clone()),
            },
            Statement::Assign {
                name: CATALOG_DIRECTORY.to_string(),
                value: Expr::Str(index.directory.clone()),
            },
            Statement::Assign {
                name: SERVERS.to_string(),
                value: Expr::List(index.servers.clone()),
            },
        ],
    };
    print_document(&doc)
}
