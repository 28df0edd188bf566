//! Structural delta between two generations of the pinned import set.
//!
//! The diff walks the union of old and new import names and classifies every
//! difference. Identity is the import name; a version-only coordinate change
//! is distinguished from every other kind of change so callers can report
//! routine version bumps separately from structural edits.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::PinnedImport;

/// Classification of one changed import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModificationKind {
    /// Present only in the new set.
    Added,
    /// Present only in the old set.
    Removed,
    /// Present in both; the artifact changed in its version and nothing else.
    VersionUpdate,
    /// Present in both; some other combination of fields changed.
    OtherUpdate,
}

impl fmt::Display for ModificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::VersionUpdate => "version update",
            Self::OtherUpdate => "updated",
        };
        f.write_str(text)
    }
}

/// One delta record: the import, what kind of change, and which fields
/// changed (`artifact`, `tags`, `visibility`), in a fixed order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Modification {
    pub name: String,
    pub kind: ModificationKind,
    pub fields: Vec<String>,
}

impl fmt::Display for Modification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ModificationKind::Added => write!(f, "+ {}", self.name),
            ModificationKind::Removed => write!(f, "- {}", self.name),
            _ => write!(f, "~ {} ({})", self.name, self.fields.join(", ")),
        }
    }
}

/// Diff two generations of the import collection.
///
/// Returns one [`Modification`] per changed import, sorted by import name
/// for deterministic iteration. Imports identical in both sets emit nothing.
#[must_use]
pub fn diff(
    old: &BTreeMap<String, PinnedImport>,
    new: &BTreeMap<String, PinnedImport>,
) -> Vec<Modification> {
    let names: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    let mut modifications = Vec::new();
    for name in names {
        match (old.get(name), new.get(name)) {
            (None, Some(_)) => modifications.push(Modification {
                name: name.clone(),
                kind: ModificationKind::Added,
                fields: Vec::new(),
            }),
            (Some(_), None) => modifications.push(Modification {
                name: name.clone(),
                kind: ModificationKind::Removed,
                fields: Vec::new(),
            }),
            (Some(before), Some(after)) => {
                if let Some(modification) = diff_import(before, after) {
                    modifications.push(modification);
                }
            }
            (None, None) => unreachable!("name came from the union of both key sets"),
        }
    }
    modifications
}

fn diff_import(before: &PinnedImport, after: &PinnedImport) -> Option<Modification> {
    let mut fields = Vec::new();
    if before.artifact != after.artifact {
        fields.push("artifact".to_string());
    }
    if before.tags() != after.tags() {
        fields.push("tags".to_string());
    }
    if before.visibility != after.visibility {
        fields.push("visibility".to_string());
    }
    if fields.is_empty() {
        return None;
    }
    let version_only = fields.len() == 1
        && fields[0] == "artifact"
        && before.artifact.differs_only_in_version(&after.artifact);
    Some(Modification {
        name: after.name.clone(),
        kind: if version_only {
            ModificationKind::VersionUpdate
        } else {
            ModificationKind::OtherUpdate
        },
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{Artifact, Exclusion};

    fn import(name: &str, coordinate: &str) -> PinnedImport {
        PinnedImport::new(name, Artifact::from_coordinate(coordinate).unwrap())
    }

    fn set(imports: Vec<PinnedImport>) -> BTreeMap<String, PinnedImport> {
        imports.into_iter().map(|i| (i.name.clone(), i)).collect()
    }

    #[test]
    fn identical_sets_yield_no_modifications() {
        let old = set(vec![import("a", "g:a:1.0"), import("b", "g:b:1.0")]);
        assert!(diff(&old, &old.clone()).is_empty());
    }

    #[test]
    fn version_bump_is_version_update() {
        let old = set(vec![import("test_test", "test:test:1.0.0")]);
        let new = set(vec![import("test_test", "test:test:1.0.1")]);
        let mods = diff(&old, &new);
        assert_eq!(mods.len(), 1);
        assert_eq!(mods[0].kind, ModificationKind::VersionUpdate);
        assert_eq!(mods[0].fields, vec!["artifact"]);
    }

    #[test]
    fn added_and_removed_are_classified() {
        let old = set(vec![import("gone", "g:gone:1.0")]);
        let new = set(vec![import("fresh", "g:fresh:1.0")]);
        let mods = diff(&old, &new);
        assert_eq!(mods.len(), 2);
        // Sorted by name: fresh before gone.
        assert_eq!(mods[0].name, "fresh");
        assert_eq!(mods[0].kind, ModificationKind::Added);
        assert_eq!(mods[1].name, "gone");
        assert_eq!(mods[1].kind, ModificationKind::Removed);
    }

    #[test]
    fn exclusion_change_is_other_update() {
        let old = set(vec![import("a", "g:a:1.0")]);
        let mut changed = import("a", "g:a:1.0");
        changed.artifact =
            changed.artifact.with_exclusion(Exclusion::new("org.slf4j", "*"));
        let new = set(vec![changed]);
        let mods = diff(&old, &new);
        assert_eq!(mods[0].kind, ModificationKind::OtherUpdate);
        assert_eq!(mods[0].fields, vec!["artifact"]);
    }

    #[test]
    fn tag_and_visibility_changes_enumerate_fields() {
        let old = set(vec![import("a", "g:a:1.0")]);
        let mut changed = import("a", "g:a:1.0");
        changed.add_tag("transitive");
        changed.visibility = vec!["//visibility:private".to_string()];
        let new = set(vec![changed]);
        let mods = diff(&old, &new);
        assert_eq!(mods[0].kind, ModificationKind::OtherUpdate);
        assert_eq!(mods[0].fields, vec!["tags", "visibility"]);
    }

    #[test]
    fn version_bump_with_tag_change_is_other_update() {
        let old = set(vec![import("a", "g:a:1.0")]);
        let mut changed = import("a", "g:a:2.0");
        changed.add_tag("transitive");
        let new = set(vec![changed]);
        let mods = diff(&old, &new);
        assert_eq!(mods[0].kind, ModificationKind::OtherUpdate);
        assert_eq!(mods[0].fields, vec!["artifact", "tags"]);
    }

    #[test]
    fn modifications_sort_by_name() {
        let old = BTreeMap::new();
        let new = set(vec![import("zeta", "g:z:1"), import("alpha", "g:a:1")]);
        let names: Vec<String> = diff(&old, &new).into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
