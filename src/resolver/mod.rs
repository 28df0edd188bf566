//! Resolver collaborator interface.
//!
//! Resolving coordinates against remote Maven repositories is outside this
//! tool's core; the surrounding system supplies an [`ArtifactResolver`] and
//! the update pipeline consumes it through this narrow seam. Version
//! placeholders are substituted *before* coordinates reach the resolver, in
//! the imported BOM list as well as in the requested artifacts.
//!
//! The BOM list rides along on every call: a real resolver feeds it into its
//! dependency-management session, where it can pin the versions of requested
//! artifacts and of anything pulled transitively.
//!
//! Failure to resolve one artifact is
//! [`MvnpinError::ArtifactNotResolved`] and is fatal for that artifact only;
//! the pipeline continues with the artifacts that did resolve.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::artifact::Artifact;
use crate::core::MvnpinError;

/// A requested artifact resolved to a concrete backing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub artifact: Artifact,
    /// Local path of the fetched artifact file.
    pub file: PathBuf,
}

/// Resolution seam to the external Maven machinery.
pub trait ArtifactResolver {
    /// Resolve one requested artifact to a concrete backing file, with the
    /// declared BOMs in effect.
    fn resolve(
        &self,
        requested: &Artifact,
        boms: &[Artifact],
    ) -> Result<ResolvedArtifact, MvnpinError>;

    /// The transitive closure pulled in by the given directly-requested
    /// artifacts under the declared BOMs, excluding the direct artifacts
    /// themselves.
    fn transitive_closure(
        &self,
        direct: &[Artifact],
        boms: &[Artifact],
    ) -> Result<Vec<ResolvedArtifact>, MvnpinError>;
}

/// Table-backed resolver for tests and offline embedding: resolution succeeds
/// for exactly the coordinates registered up front, and each registered BOM
/// contributes its own transitive entries only when the caller declares it.
#[derive(Debug, Default)]
pub struct TableResolver {
    entries: BTreeMap<String, ResolvedArtifact>,
    transitive: Vec<ResolvedArtifact>,
    bom_transitive: BTreeMap<String, Vec<ResolvedArtifact>>,
}

impl TableResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolvable artifact.
    pub fn insert(&mut self, artifact: Artifact, file: impl Into<PathBuf>) {
        self.entries.insert(
            artifact.coordinate(),
            ResolvedArtifact { artifact, file: file.into() },
        );
    }

    /// Register an artifact reported as part of every transitive closure.
    pub fn insert_transitive(&mut self, artifact: Artifact, file: impl Into<PathBuf>) {
        self.transitive.push(ResolvedArtifact { artifact, file: file.into() });
    }

    /// Register an artifact pulled into the transitive closure whenever
    /// `bom` is among the declared BOMs.
    pub fn insert_bom_transitive(
        &mut self,
        bom: &Artifact,
        artifact: Artifact,
        file: impl Into<PathBuf>,
    ) {
        self.bom_transitive
            .entry(bom.coordinate())
            .or_default()
            .push(ResolvedArtifact { artifact, file: file.into() });
    }
}

impl ArtifactResolver for TableResolver {
    fn resolve(
        &self,
        requested: &Artifact,
        _boms: &[Artifact],
    ) -> Result<ResolvedArtifact, MvnpinError> {
        self.entries.get(&requested.coordinate()).cloned().ok_or_else(|| {
            MvnpinError::ArtifactNotResolved { coordinate: requested.coordinate() }
        })
    }

    fn transitive_closure(
        &self,
        _direct: &[Artifact],
        boms: &[Artifact],
    ) -> Result<Vec<ResolvedArtifact>, MvnpinError> {
        let mut closure = self.transitive.clone();
        for bom in boms {
            if let Some(entries) = self.bom_transitive.get(&bom.coordinate()) {
                closure.extend(entries.iter().cloned());
            }
        }
        Ok(closure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_resolver_resolves_registered_artifacts() {
        let mut resolver = TableResolver::new();
        let guava = Artifact::from_coordinate("com.google.guava:guava:31.0-jre").unwrap();
        resolver.insert(guava.clone(), "/cache/guava.jar");
        let resolved = resolver.resolve(&guava, &[]).unwrap();
        assert_eq!(resolved.file, PathBuf::from("/cache/guava.jar"));
    }

    #[test]
    fn unknown_artifact_is_not_resolved() {
        let resolver = TableResolver::new();
        let missing = Artifact::from_coordinate("g:a:1.0").unwrap();
        let err = resolver.resolve(&missing, &[]).unwrap_err();
        assert!(
            matches!(err, MvnpinError::ArtifactNotResolved { coordinate } if coordinate == "g:a:1.0")
        );
    }

    #[test]
    fn bom_entries_join_the_closure_only_when_declared() {
        let mut resolver = TableResolver::new();
        let bom = Artifact::from_coordinate("com.fake:platform-bom:pom:1.0").unwrap();
        let managed = Artifact::from_coordinate("com.fake:managed:2.0").unwrap();
        resolver.insert_bom_transitive(&bom, managed.clone(), "/cache/managed.jar");

        assert!(resolver.transitive_closure(&[], &[]).unwrap().is_empty());
        let closure = resolver.transitive_closure(&[], &[bom]).unwrap();
        assert_eq!(closure.len(), 1);
        assert_eq!(closure[0].artifact, managed);
    }
}
