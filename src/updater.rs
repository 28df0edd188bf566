//! The update pipeline: declaration → resolution → delta → visibility.
//!
//! One invocation runs synchronously through four stages:
//!
//! 1. substitute version placeholders in the declared coordinates, imported
//!    BOMs included
//! 2. resolve direct artifacts and their transitive closure through the
//!    external [`ArtifactResolver`], with the substituted BOMs in effect
//! 3. derive target names, tag transitively-pulled imports, and compute
//!    per-import visibility through the configured strategy
//! 4. diff the new generation against the loaded catalog
//!
//! Saving is the caller's move ([`crate::catalog::Catalog::save`]), so a dry
//! run can stop after the diff. An artifact the resolver cannot supply is
//! fatal for that artifact only; it is reported in
//! [`UpdateOutcome::failures`] and the rest of the pipeline proceeds.

use anyhow::Result;
use tracing::{debug, warn};

use crate::artifact::Artifact;
use crate::catalog::delta::Modification;
use crate::catalog::{Catalog, PinnedImport, TRANSITIVE_TAG};
use crate::core::MvnpinError;
use crate::manifest::Manifest;
use crate::naming;
use crate::resolver::{ArtifactResolver, ResolvedArtifact};
use crate::visibility::{ReverseDeps, VisibilityStrategy};

/// Result of one pipeline run.
#[derive(Debug)]
pub struct UpdateOutcome {
    /// Changes between the loaded catalog and the new generation, sorted by
    /// import name.
    pub modifications: Vec<Modification>,
    /// Artifacts the resolver could not supply, with their errors.
    pub failures: Vec<(Artifact, MvnpinError)>,
}

/// Run the pipeline against `catalog`.
///
/// With `dry_run` the catalog collection is left untouched and only the
/// delta is reported.
pub fn update_catalog(
    catalog: &mut Catalog,
    manifest: &Manifest,
    resolver: &dyn ArtifactResolver,
    reverse_deps: &dyn ReverseDeps,
    strategy: &dyn VisibilityStrategy,
    dry_run: bool,
) -> Result<UpdateOutcome> {
    let boms: Vec<Artifact> = manifest
        .boms
        .iter()
        .map(|declared| manifest.substituted(declared))
        .collect::<Result<_, _>>()?;

    let mut failures = Vec::new();
    let mut resolved_direct: Vec<ResolvedArtifact> = Vec::new();
    for declared in &manifest.dependencies {
        let requested = manifest.substituted(declared)?;
        match resolver.resolve(&requested, &boms) {
            Ok(resolved) => resolved_direct.push(resolved),
            Err(err) => {
                warn!(coordinate = %requested.coordinate(), %err, "artifact not resolved");
                failures.push((requested, err));
            }
        }
    }

    let direct_artifacts: Vec<Artifact> =
        resolved_direct.iter().map(|r| r.artifact.clone()).collect();
    let transitive = resolver.transitive_closure(&direct_artifacts, &boms)?;
    debug!(
        boms = boms.len(),
        direct = resolved_direct.len(),
        transitive = transitive.len(),
        failed = failures.len(),
        "resolution complete"
    );

    let mut imports: Vec<PinnedImport> = Vec::new();
    let mut seen = std::collections::BTreeSet::new();
    for (resolved, is_transitive) in resolved_direct
        .iter()
        .map(|r| (r, false))
        .chain(transitive.iter().map(|r| (r, true)))
    {
        let artifact = &resolved.artifact;
        let name = naming::to_target_name(
            &artifact.group_id,
            &artifact.artifact_id,
            artifact.extension.as_deref(),
            artifact.classifier.as_deref(),
        );
        if !seen.insert(name.clone()) {
            continue;
        }
        let mut import = PinnedImport::new(name, artifact.clone());
        if is_transitive {
            import.add_tag(TRANSITIVE_TAG);
        }
        import.visibility = strategy
            .visibility(&import.name, &import.artifact, import.tags(), reverse_deps)
            .into_iter()
            .collect();
        imports.push(import);
    }

    let modifications = catalog.replace_content(imports, dry_run)?;
    Ok(UpdateOutcome { modifications, failures })
}
