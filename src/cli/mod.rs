//! Command-line interface for mvnpin.
//!
//! Offline commands only; commands that need the remote Maven machinery go
//! through the embedding system, which drives [`crate::updater`] with its
//! own resolver. What the CLI offers:
//!
//! - `check`: parse the declaration file and every catalog file, verifying
//!   round-trip fidelity
//! - `list`: print the pinned imports in the catalog
//! - `diff`: dry-run delta between the catalog and a second catalog
//!   directory

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use crate::catalog::{Catalog, INDEX_FILE};
use crate::config::Config;
use crate::document::printer::print_document;
use crate::document::{self};
use crate::manifest::Manifest;
use crate::reporter::{ConsoleSink, MessageSink};

/// Pinned Maven dependency catalog manager.
#[derive(Debug, Parser)]
#[command(name = "mvnpin", version, about)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "mvnpin.toml")]
    pub config: PathBuf,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Verify that the declaration file and catalog parse and round-trip.
    Check,
    /// List the pinned imports in the catalog.
    List,
    /// Show what would change if the catalog were replaced by another
    /// catalog directory.
    Diff {
        /// Directory of the catalog to diff against.
        against: PathBuf,
    },
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        let config = Config::load(&self.config)?;
        let sink = ConsoleSink;
        match self.command {
            Commands::Check => check(&config, &sink),
            Commands::List => list(&config, &sink),
            Commands::Diff { against } => diff(&config, &against, &sink),
        }
    }
}

fn catalog_dir(config: &Config) -> Result<PathBuf> {
    let dir = if config.catalog_directory.is_absolute() {
        config.catalog_directory.clone()
    } else {
        std::env::current_dir()?.join(&config.catalog_directory)
    };
    Ok(dir)
}

fn check(config: &Config, sink: &dyn MessageSink) -> Result<()> {
    let mut problems = 0usize;

    if config.declaration_file.exists() {
        let manifest = Manifest::load(&config.declaration_file)?;
        let reparsed = Manifest::parse_str(&manifest.print())
            .context("declaration file does not round-trip")?;
        if reparsed == manifest {
            sink.info(&format!(
                "declaration file ok: {} version variables, {} BOMs, {} dependencies",
                manifest.versions().len(),
                manifest.boms.len(),
                manifest.dependencies.len()
            ));
        } else {
            sink.error("declaration file loses data on round-trip");
            problems += 1;
        }
    } else {
        sink.warning(&format!(
            "no declaration file at {}",
            config.declaration_file.display()
        ));
    }

    let dir = catalog_dir(config)?;
    let catalog = Catalog::load(&dir, config.deep_group_prefixes.clone())?;
    sink.info(&format!("catalog ok: {} pinned imports", catalog.len()));

    // Files this tool generated must be byte-stable under parse+print.
    if dir.join(INDEX_FILE).exists() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|e| e != "bzl") {
                continue;
            }
            let text = fs::read_to_string(&path)?;
            let doc = document::parse(&text)
                .with_context(|| format!("cannot parse {}", path.display()))?;
            if print_document(&doc) != text {
                sink.warning(&format!(
                    "{} was not produced by this tool (reformatting would change it)",
                    path.display()
                ));
            }
        }
    }

    if problems > 0 {
        bail!("check found {problems} problem(s)");
    }
    Ok(())
}

fn list(config: &Config, sink: &dyn MessageSink) -> Result<()> {
    let dir = catalog_dir(config)?;
    let catalog = Catalog::load(&dir, config.deep_group_prefixes.clone())?;
    if catalog.is_empty() {
        sink.notice("catalog is empty");
        return Ok(());
    }
    for import in catalog.imports() {
        let mut line = format!("{} {}", import.name, import.artifact.coordinate());
        if !import.tags().is_empty() {
            line.push_str(&format!(" [{}]", import.tags().join(", ")));
        }
        sink.info(&line);
    }
    Ok(())
}

fn diff(config: &Config, against: &PathBuf, sink: &dyn MessageSink) -> Result<()> {
    let dir = catalog_dir(config)?;
    let mut catalog = Catalog::load(&dir, config.deep_group_prefixes.clone())?;
    let other = Catalog::load(against, config.deep_group_prefixes.clone())?;
    let imports = other.imports().cloned().collect();
    let modifications = catalog.replace_content(imports, true)?;
    if modifications.is_empty() {
        sink.notice("no changes");
        return Ok(());
    }
    for modification in &modifications {
        sink.info(&modification.to_string());
    }
    sink.notice(&format!("{} change(s)", modifications.len()));
    Ok(())
}
