//! Error handling for mvnpin.
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`MvnpinError`]) so callers can match on the
//!    failure mode
//! 2. **User-friendly rendering** ([`render_error`]) for CLI display with
//!    actionable suggestions
//!
//! # Taxonomy
//!
//! - [`MvnpinError::Parse`]: a declaration or catalog file uses a construct
//!   outside the supported dialect subset. Always fatal for that file; the
//!   document model never best-effort recovers, because round-trip fidelity
//!   requires exact understanding of every construct in a managed file.
//! - [`MvnpinError::ArtifactNotResolved`]: the resolver collaborator could
//!   not supply a backing file for a requested artifact. Fatal for that
//!   artifact only; unrelated artifacts proceed.
//! - [`MvnpinError::ScmWrite`]: the SCM collaborator could not make a target
//!   path writable. Fatal for that file's save step.
//! - [`MvnpinError::Config`]: invalid tool configuration, e.g. an
//!   unsupported SCM tool identifier. Fatal at startup.
//!
//! Diffing and visibility resolution are pure functions over validated
//! in-memory data and raise no domain errors of their own.

use colored::Colorize;
use std::path::PathBuf;
use thiserror::Error;

use crate::document::ParseError;

/// The main error type for mvnpin operations.
#[derive(Debug, Error)]
pub enum MvnpinError {
    /// A file uses a construct outside the supported dialect grammar.
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// A coordinate string does not match
    /// `groupId:artifactId[:extension[:classifier]]:version`.
    #[error("invalid artifact coordinate '{coordinate}'")]
    InvalidCoordinate { coordinate: String },

    /// A version placeholder references a variable the declaration file does
    /// not define.
    #[error("unknown version variable '${{{name}}}'")]
    UnknownVersionVariable { name: String },

    /// A declaration or catalog document is grammatically valid but
    /// semantically malformed (duplicate names, missing attributes, foreign
    /// statements).
    #[error("invalid document: {message}")]
    InvalidDocument { message: String },

    /// The resolver collaborator could not supply a backing file.
    #[error("artifact not resolved: {coordinate}")]
    ArtifactNotResolved { coordinate: String },

    /// The SCM collaborator failed to write or remove a file.
    #[error("scm write failed for {}: {reason}", path.display())]
    ScmWrite { path: PathBuf, reason: String },

    /// Invalid tool configuration.
    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MvnpinError {
    /// A short suggestion for the most common failure modes, shown beneath
    /// the error message on the CLI.
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Parse(_) => Some(
                "the file uses a construct outside the supported dialect; \
                 regenerate it with mvnpin or reduce it to assignments, string \
                 lists and keyword-argument calls",
            ),
            Self::InvalidCoordinate { .. } => {
                Some("coordinates follow groupId:artifactId[:extension[:classifier]]:version")
            }
            Self::UnknownVersionVariable { .. } => {
                Some("define the variable in the declaration file before referencing it")
            }
            Self::Config { .. } => Some("check mvnpin.toml"),
            _ => None,
        }
    }
}

/// Render an error chain for CLI display, colored, with a suggestion when a
/// known [`MvnpinError`] is at the root.
#[must_use]
pub fn render_error(err: &anyhow::Error) -> String {
    let mut out = format!("{} {}", "error:".red().bold(), err);
    for cause in err.chain().skip(1) {
        out.push_str(&format!("\n  {} {}", "caused by:".yellow(), cause));
    }
    if let Some(suggestion) = err.downcast_ref::<MvnpinError>().and_then(MvnpinError::suggestion) {
        out.push_str(&format!("\n  {} {}", "hint:".cyan(), suggestion));
    }
    out
}
