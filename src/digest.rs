//! Digest collaborator: hex digests of resolved artifact files.
//!
//! Maven repositories ship digest side-car files next to artifacts; when a
//! cache file named `<artifact-file>.<algorithm-extension>` exists, its first
//! non-whitespace token is taken as the digest instead of re-hashing the
//! artifact.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256, Sha512};
use tracing::trace;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Sha256,
    Sha512,
}

impl Algorithm {
    /// The extension of the on-disk cache file.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Hex digest of the file at `path`, honoring the digest cache file when one
/// is present.
pub fn file_digest(path: &Path, algorithm: Algorithm) -> Result<String> {
    let cache = cache_path(path, algorithm);
    if cache.exists() {
        let text = fs::read_to_string(&cache)
            .with_context(|| format!("cannot read digest cache {}", cache.display()))?;
        if let Some(digest) = text.split_whitespace().next() {
            trace!(path = %path.display(), %algorithm, "digest served from cache");
            return Ok(digest.to_string());
        }
    }
    let content = fs::read(path)
        .with_context(|| format!("cannot read artifact file {}", path.display()))?;
    let digest = match algorithm {
        Algorithm::Sha256 => hex::encode(Sha256::digest(&content)),
        Algorithm::Sha512 => hex::encode(Sha512::digest(&content)),
    };
    Ok(digest)
}

fn cache_path(path: &Path, algorithm: Algorithm) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".");
    os.push(algorithm.extension());
    PathBuf::from(os)
}
