//! Core shared types for mvnpin.

pub mod error;

pub use error::{MvnpinError, render_error};
