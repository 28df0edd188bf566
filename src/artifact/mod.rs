//! Maven artifact identity and exclusions.
//!
//! An [`Artifact`] is the identity tuple `(groupId, artifactId, version,
//! extension, classifier)` plus an ordered set of [`Exclusion`]s and two
//! independent flags (`optional`, `test_only`). Equality and hashing are
//! structural over *all* fields: two artifacts that differ only in their
//! exclusions are unequal and hash differently. Natural order is
//! `(groupId, artifactId, version)` lexicographic, with the remaining fields
//! as tiebreakers so ordering stays consistent with equality.
//!
//! The default packaging extension `jar` is normalized away: an artifact
//! declared with extension `jar` is the same artifact as one declared with no
//! extension, which keeps coordinate round-trips stable for artifacts that
//! carry a classifier but no explicit extension.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use crate::core::MvnpinError;

/// The default Maven packaging, never rendered or stored explicitly.
pub const DEFAULT_EXTENSION: &str = "jar";

/// A dependency exclusion `(groupId, artifactId)`. `"*"` matches any value
/// in either field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
}

impl Exclusion {
    #[must_use]
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self { group_id: group_id.into(), artifact_id: artifact_id.into() }
    }

    /// Parse `"groupId:artifactId"`.
    pub fn from_spec(spec: &str) -> Result<Self, MvnpinError> {
        match spec.split(':').collect::<Vec<_>>().as_slice() {
            [group, artifact] if !group.is_empty() && !artifact.is_empty() => {
                Ok(Self::new(*group, *artifact))
            }
            _ => Err(MvnpinError::InvalidCoordinate { coordinate: spec.to_string() }),
        }
    }

    /// Whether this exclusion matches the given coordinates, honoring `"*"`
    /// wildcards.
    #[must_use]
    pub fn matches(&self, group_id: &str, artifact_id: &str) -> bool {
        (self.group_id == "*" || self.group_id == group_id)
            && (self.artifact_id == "*" || self.artifact_id == artifact_id)
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// A resolved or requested Maven artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Artifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    /// Packaging extension; `None` means the default `jar`.
    pub extension: Option<String>,
    pub classifier: Option<String>,
    /// Exclusions applied to this artifact's transitive dependencies,
    /// ordered for deterministic serialization.
    pub exclusions: BTreeSet<Exclusion>,
    pub optional: bool,
    pub test_only: bool,
}

impl Artifact {
    #[must_use]
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            extension: None,
            classifier: None,
            exclusions: BTreeSet::new(),
            optional: false,
            test_only: false,
        }
    }

    /// Parse a canonical coordinate string
    /// `groupId:artifactId[:extension[:classifier]]:version`.
    ///
    /// The `jar` extension normalizes to `None`.
    pub fn from_coordinate(coordinate: &str) -> Result<Self, MvnpinError> {
        let parts: Vec<&str> = coordinate.split(':').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(MvnpinError::InvalidCoordinate { coordinate: coordinate.to_string() });
        }
        let (group, artifact, extension, classifier, version) = match parts.as_slice() {
            [g, a, v] => (*g, *a, None, None, *v),
            [g, a, e, v] => (*g, *a, Some(*e), None, *v),
            [g, a, e, c, v] => (*g, *a, Some(*e), Some(*c), *v),
            _ => {
                return Err(MvnpinError::InvalidCoordinate { coordinate: coordinate.to_string() });
            }
        };
        let mut result = Self::new(group, artifact, version);
        result.extension = extension.filter(|e| *e != DEFAULT_EXTENSION).map(str::to_string);
        result.classifier = classifier.map(str::to_string);
        Ok(result)
    }

    /// The canonical coordinate string. A classifier without an explicit
    /// extension renders the default `jar` so the coordinate stays parseable.
    #[must_use]
    pub fn coordinate(&self) -> String {
        match (&self.extension, &self.classifier) {
            (None, None) => format!("{}:{}:{}", self.group_id, self.artifact_id, self.version),
            (Some(ext), None) => {
                format!("{}:{}:{}:{}", self.group_id, self.artifact_id, ext, self.version)
            }
            (ext, Some(cls)) => format!(
                "{}:{}:{}:{}:{}",
                self.group_id,
                self.artifact_id,
                ext.as_deref().unwrap_or(DEFAULT_EXTENSION),
                cls,
                self.version
            ),
        }
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = (extension != DEFAULT_EXTENSION).then_some(extension);
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    #[must_use]
    pub fn with_exclusion(mut self, exclusion: Exclusion) -> Self {
        self.exclusions.insert(exclusion);
        self
    }

    /// Whether `other` is the same artifact except for its version. Used by
    /// the delta engine to distinguish version bumps from other changes.
    #[must_use]
    pub fn differs_only_in_version(&self, other: &Self) -> bool {
        self.version != other.version
            && self.group_id == other.group_id
            && self.artifact_id == other.artifact_id
            && self.extension == other.extension
            && self.classifier == other.classifier
            && self.exclusions == other.exclusions
            && self.optional == other.optional
            && self.test_only == other.test_only
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.coordinate())
    }
}

impl Ord for Artifact {
    fn cmp(&self, other: &Self) -> Ordering {
        self.group_id
            .cmp(&other.group_id)
            .then_with(|| self.artifact_id.cmp(&other.artifact_id))
            .then_with(|| self.version.cmp(&other.version))
            .then_with(|| self.extension.cmp(&other.extension))
            .then_with(|| self.classifier.cmp(&other.classifier))
            .then_with(|| self.exclusions.cmp(&other.exclusions))
            .then_with(|| self.optional.cmp(&other.optional))
            .then_with(|| self.test_only.cmp(&other.test_only))
    }
}

impl PartialOrd for Artifact {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
