//! Visibility resolution for pinned imports.
//!
//! Visibility is a policy, so it sits behind the [`VisibilityStrategy`]
//! trait: the surrounding system may supply an alternative implementation as
//! long as it conforms to the same contract: compute a set of visibility
//! labels from `(name, artifact, tags, reverse-dependency lookup)`. An empty
//! result means default/public visibility.
//!
//! The shipped policy is [`StrictDepsVisibility`], which enforces "strict
//! deps" discipline: a transitively-pulled artifact is visible only to the
//! importers that actually need it, and a transitive import nothing depends
//! on becomes private rather than silently public.

use std::collections::BTreeSet;

use crate::artifact::Artifact;
use crate::catalog::TRANSITIVE_TAG;

/// The maximally-restrictive visibility label.
pub const PRIVATE_VISIBILITY: &str = "//visibility:private";

/// Reverse-dependency lookup supplied by the surrounding system from its
/// resolved dependency graph.
///
/// Any closure `Fn(&str) -> Vec<String>` is a `ReverseDeps`; no object
/// identity is needed beyond the lookup itself.
pub trait ReverseDeps {
    /// Names of the pinned imports that directly depend on `import_name`.
    fn direct_reverse_dependencies(&self, import_name: &str) -> Vec<String>;
}

impl<F> ReverseDeps for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn direct_reverse_dependencies(&self, import_name: &str) -> Vec<String> {
        self(import_name)
    }
}

/// Capability to compute the visibility label set for one pinned import.
pub trait VisibilityStrategy {
    /// Compute the visibility labels for the import. Empty means
    /// default/public.
    fn visibility(
        &self,
        name: &str,
        artifact: &Artifact,
        tags: &[String],
        reverse_deps: &dyn ReverseDeps,
    ) -> BTreeSet<String>;
}

/// Strict-deps visibility policy.
///
/// - strict mode disabled, or the import is not transitive-only: empty set
/// - transitive-only with reverse dependencies: one label per reverse
///   dependency, granting access to that dependency's package subtree
/// - transitive-only with no reverse dependencies: [`PRIVATE_VISIBILITY`]
#[derive(Debug, Clone, Copy)]
pub struct StrictDepsVisibility {
    strict: bool,
}

impl StrictDepsVisibility {
    #[must_use]
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }
}

impl VisibilityStrategy for StrictDepsVisibility {
    fn visibility(
        &self,
        name: &str,
        _artifact: &Artifact,
        tags: &[String],
        reverse_deps: &dyn ReverseDeps,
    ) -> BTreeSet<String> {
        if !self.strict || !tags.iter().any(|t| t == TRANSITIVE_TAG) {
            return BTreeSet::new();
        }
        let rdeps = reverse_deps.direct_reverse_dependencies(name);
        if rdeps.is_empty() {
            return BTreeSet::from([PRIVATE_VISIBILITY.to_string()]);
        }
        rdeps.into_iter().map(|dep| format!("@{dep}//:__subpackages__")).collect()
    }
}
