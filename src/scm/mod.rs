//! Source-control writer collaborator.
//!
//! The catalog engine never touches the filesystem directly on the write
//! path; it produces text and hands it to a [`ScmWriter`]. This keeps the
//! engine testable and lets the surrounding system substitute an
//! implementation that talks to its real SCM.
//!
//! Both operations take absolute paths: writing through a relative path
//! would silently depend on the process working directory, so it is rejected
//! as a contract violation.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::core::MvnpinError;

/// Content written in place of a removed file when the SCM cannot delete.
pub const OBSOLETE_MARKER: &str = "# This file is obsolete, please delete.\n";

/// Write-side interface to the source-control system.
///
/// All content is UTF-8 text.
pub trait ScmWriter: std::fmt::Debug {
    /// Write `content` to `path`, creating parent directories and making the
    /// file writable as needed. A file that already holds exactly `content`
    /// is left untouched.
    ///
    /// Returns whether the file changed. Newly created files are registered
    /// as tracked.
    fn write_file(&mut self, path: &Path, content: &str) -> Result<bool, MvnpinError>;

    /// Remove the file at `path`.
    ///
    /// Returns `true` if the file was deleted. An SCM that does not support
    /// deletion overwrites the content with [`OBSOLETE_MARKER`] instead and
    /// returns `false`.
    fn remove_file(&mut self, path: &Path) -> Result<bool, MvnpinError>;
}

/// Plain filesystem implementation of [`ScmWriter`].
///
/// Tracks the paths it created during the run; a real SCM integration would
/// register those with its tool.
#[derive(Debug, Default)]
pub struct FsScm {
    supports_delete: bool,
    tracked: Vec<PathBuf>,
}

impl FsScm {
    /// Writer that deletes removed files.
    #[must_use]
    pub fn new() -> Self {
        Self { supports_delete: true, tracked: Vec::new() }
    }

    /// Writer that marks removed files obsolete instead of deleting them.
    #[must_use]
    pub fn without_delete() -> Self {
        Self { supports_delete: false, tracked: Vec::new() }
    }

    /// Paths newly created by this writer during the run.
    #[must_use]
    pub fn tracked(&self) -> &[PathBuf] {
        &self.tracked
    }

    fn scm_error(path: &Path, reason: impl ToString) -> MvnpinError {
        MvnpinError::ScmWrite { path: path.to_path_buf(), reason: reason.to_string() }
    }

    fn make_writable(path: &Path) -> Result<(), MvnpinError> {
        let metadata = fs::metadata(path).map_err(|e| Self::scm_error(path, e))?;
        let mut permissions = metadata.permissions();
        if permissions.readonly() {
            #[allow(clippy::permissions_set_readonly_false)]
            permissions.set_readonly(false);
            fs::set_permissions(path, permissions).map_err(|e| Self::scm_error(path, e))?;
        }
        Ok(())
    }
}

impl ScmWriter for FsScm {
    fn write_file(&mut self, path: &Path, content: &str) -> Result<bool, MvnpinError> {
        if !path.is_absolute() {
            return Err(Self::scm_error(path, "path must be absolute"));
        }
        let existed = path.exists();
        if existed {
            if let Ok(current) = fs::read_to_string(path) {
                if current == content {
                    trace!(path = %path.display(), "content unchanged, skipping write");
                    return Ok(false);
                }
            }
            Self::make_writable(path)?;
        } else if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::scm_error(path, e))?;
        }
        fs::write(path, content).map_err(|e| Self::scm_error(path, e))?;
        if !existed {
            self.tracked.push(path.to_path_buf());
        }
        debug!(path = %path.display(), created = !existed, "wrote file");
        Ok(true)
    }

    fn remove_file(&mut self, path: &Path) -> Result<bool, MvnpinError> {
        if !path.is_absolute() {
            return Err(Self::scm_error(path, "path must be absolute"));
        }
        if !path.exists() {
            return Ok(false);
        }
        if self.supports_delete {
            fs::remove_file(path).map_err(|e| Self::scm_error(path, e))?;
            debug!(path = %path.display(), "deleted file");
            Ok(true)
        } else {
            Self::make_writable(path)?;
            fs::write(path, OBSOLETE_MARKER).map_err(|e| Self::scm_error(path, e))?;
            debug!(path = %path.display(), "marked file obsolete");
            Ok(false)
        }
    }
}
