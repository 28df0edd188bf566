//! Naming conventions mapping Maven coordinates to build target names and
//! catalog file-group identifiers.
//!
//! These are pure functions with no state. The group and artifact ids are
//! normalized by replacing every `.` and `-` with `_`; extension and
//! classifier suffixes are appended as written.
//!
//! # Known collision
//!
//! The extension and classifier suffixes are applied independently, so an
//! artifact with `extension = "war"` and no classifier produces the same
//! target name as one with no extension and `classifier = "war"`. This is an
//! accepted limitation of the naming scheme, not resolved here.

fn normalize(identifier: &str) -> String {
    identifier.replace(['.', '-'], "_")
}

/// Normalize a single identifier token: hyphens become underscores.
#[must_use]
pub fn to_target_name_single(identifier: &str) -> String {
    identifier.replace('-', "_")
}

/// Derive the build target name for an artifact.
///
/// The base is `normalize(groupId) + "_" + normalize(artifactId)`. If the
/// extension is present, non-empty and not `"jar"`, `"_" + extension` is
/// appended unaltered; the classifier is treated the same way, after the
/// extension.
///
/// ```
/// use mvnpin::naming::to_target_name;
///
/// assert_eq!(to_target_name("com.google.guava", "guava", None, None), "com_google_guava_guava");
/// assert_eq!(
///     to_target_name("com.google.guava", "guava", Some("pom"), None),
///     "com_google_guava_guava_pom"
/// );
/// ```
#[must_use]
pub fn to_target_name(
    group_id: &str,
    artifact_id: &str,
    extension: Option<&str>,
    classifier: Option<&str>,
) -> String {
    let mut name = format!("{}_{}", normalize(group_id), normalize(artifact_id));
    for suffix in [extension, classifier] {
        if let Some(suffix) = suffix {
            if !suffix.is_empty() && suffix != "jar" {
                name.push('_');
                name.push_str(suffix);
            }
        }
    }
    name
}

/// Derive the catalog file-group identifier for a group id.
///
/// The group id is split on `.`. With one segment or fewer it is returned
/// unchanged. Otherwise the leading two segments are joined with `_`, or
/// three for group ids under one of the configured deep organizational
/// prefixes, which keeps very large internal namespaces from collapsing into
/// one oversized catalog file. The segment count is clamped to what is
/// available.
#[must_use]
pub fn file_group(group_id: &str, deep_prefixes: &[String]) -> String {
    let segments: Vec<&str> = group_id.split('.').collect();
    if segments.len() <= 1 {
        return group_id.to_string();
    }
    let deep = deep_prefixes
        .iter()
        .any(|p| group_id == p || group_id.starts_with(&format!("{p}.")));
    let take = if deep { 3 } else { 2 }.min(segments.len());
    segments[..take]
        .iter()
        .map(|s| to_target_name_single(s))
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deep() -> Vec<String> {
        vec!["com.salesforce".to_string()]
    }

    #[test]
    fn target_name_plain() {
        assert_eq!(
            to_target_name("com.google.guava", "guava", None, None),
            "com_google_guava_guava"
        );
    }

    #[test]
    fn target_name_with_extension() {
        assert_eq!(
            to_target_name("com.google.guava", "guava", Some("pom"), None),
            "com_google_guava_guava_pom"
        );
    }

    #[test]
    fn target_name_with_classifier() {
        assert_eq!(
            to_target_name("com.google.guava", "guava", None, Some("sources")),
            "com_google_guava_guava_sources"
        );
    }

    #[test]
    fn jar_and_empty_suffixes_are_skipped() {
        assert_eq!(to_target_name("g", "a", Some("jar"), Some("")), "g_a");
    }

    #[test]
    fn suffixes_are_appended_as_written() {
        assert_eq!(to_target_name("g", "a", Some("tar.gz"), None), "g_a_tar.gz");
        assert_eq!(
            to_target_name("g", "a", None, Some("linux-x86_64")),
            "g_a_linux-x86_64"
        );
    }

    #[test]
    fn extension_classifier_collision_is_accepted() {
        assert_eq!(
            to_target_name("g", "a", Some("war"), None),
            to_target_name("g", "a", None, Some("war"))
        );
    }

    #[test]
    fn single_token_normalization_touches_hyphens_only() {
        assert_eq!(to_target_name_single("jakarta-commons"), "jakarta_commons");
        assert_eq!(to_target_name_single("spring.boot-starter"), "spring.boot_starter");
    }

    #[test]
    fn file_group_single_segment_unchanged() {
        assert_eq!(file_group("commons", &deep()), "commons");
    }

    #[test]
    fn file_group_takes_two_segments() {
        assert_eq!(file_group("commons.lang.third", &deep()), "commons_lang");
        assert_eq!(file_group("com.google.guava", &deep()), "com_google");
    }

    #[test]
    fn file_group_deep_prefix_takes_three() {
        assert_eq!(file_group("com.salesforce.a.b.c", &deep()), "com_salesforce_a");
    }

    #[test]
    fn file_group_clamps_to_available_segments() {
        assert_eq!(file_group("com.salesforce", &deep()), "com_salesforce");
    }
}
