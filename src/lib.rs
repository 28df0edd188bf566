//! mvnpin is a pinned Maven dependency catalog manager for Bazel-style
//! builds.
//!
//! It follows a declaration/catalog model, similar to a manifest and
//! lockfile:
//!
//! - the *declaration file* (human-owned) lists version variables, imported
//!   BOMs, and directly requested artifacts
//! - the *pinned catalog* (machine-owned) records every resolved import,
//!   direct and transitive, split across one dialect file per file-group
//!   plus an index file
//!
//! Both are written in a restricted Starlark-like configuration dialect that
//! round-trips byte-for-byte through this crate's parser and pretty-printer,
//! so generated files stay stable under source control.
//!
//! # Pipeline
//!
//! One invocation is a single-threaded, synchronous pipeline: parse the
//! declaration, resolve coordinates through the external resolver seam, diff
//! the new generation against the loaded catalog, compute per-import
//! visibility, and serialize the catalog back through the SCM writer
//! collaborator. See [`updater`] for the orchestration.
//!
//! # Core modules
//!
//! - [`document`]: dialect parser and round-trip-preserving pretty-printer
//! - [`artifact`]: Maven artifact identity, exclusions, coordinate parsing
//! - [`naming`]: coordinate to target-name and file-group derivation
//! - [`manifest`]: the dependency declaration layer
//! - [`catalog`]: the pinned catalog and its delta engine
//! - [`visibility`]: strict-deps visibility resolution
//!
//! # Collaborator seams
//!
//! - [`resolver`]: external Maven resolution
//! - [`scm`]: source-control writes
//! - [`digest`]: artifact file digests
//! - [`reporter`]: console messages and progress

pub mod artifact;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod digest;
pub mod document;
pub mod manifest;
pub mod naming;
pub mod reporter;
pub mod resolver;
pub mod scm;
pub mod updater;
pub mod visibility;
