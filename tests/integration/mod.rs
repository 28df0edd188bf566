//! Integration test suite for mvnpin.
//!
//! Exercises the full pipeline end to end: declaration parsing, resolution
//! through the table-backed resolver, catalog delta, visibility, save through
//! the SCM writer, and the CLI commands.
//!
//! ```bash
//! cargo test --test integration
//! ```

mod cli;
mod pipeline;
mod roundtrip;
