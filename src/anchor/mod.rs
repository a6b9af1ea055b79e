//! Anchor name codec
//!
//! Anchors are named `{category}__{label}` or `{category}__{label}__{sub_variant}`.
//! The category picks the placement settings and the resolution path; the
//! bare name (sub-variant removed) is the key used to look content up.
//!
//! A three-segment name is only treated as carrying a sub-variant when its last
//! segment is a configured sub-variant of the category. Otherwise the segment
//! stays part of the bare name.

use crate::settings::CategorySettings;

/// Separator between anchor name segments
pub const SEPARATOR: &str = "__";

/// Reserved category for dynamic text
pub const TEXT_CATEGORY: &str = "text";

/// Split an anchor name into its category and the remaining segments
pub fn split(name: &str) -> (&str, Vec<&str>) {
    let mut segments = name.split(SEPARATOR);
    // `str::split` always yields at least one item
    let category = segments.next().unwrap_or_default();
    (category, segments.collect())
}

/// Result of stripping an optional sub-variant from an anchor name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupName {
    /// Name used to fetch content
    pub bare_name: String,
    /// Sub-variant key selected by the trailing segment
    pub sub_variant: Option<String>,
}

/// Separate the sub-variant segment from an anchor name
///
/// Only a name with exactly three segments whose last segment is a
/// sub-variant key of `category_settings` loses that segment.
pub fn resolve_lookup_name(name: &str, category_settings: Option<&CategorySettings>) -> LookupName {
    let segments: Vec<&str> = name.split(SEPARATOR).collect();

    if let ([first, second, last], Some(settings)) = (segments.as_slice(), category_settings) {
        if settings.has_sub_variant(last) {
            return LookupName {
                bare_name: join(&[*first, *second]),
                sub_variant: Some(last.to_string()),
            };
        }
    }

    LookupName {
        bare_name: name.to_string(),
        sub_variant: None,
    }
}

/// Build an anchor name from its parts
pub fn build(category: &str, label: &str, sub_variant: Option<&str>) -> String {
    match sub_variant {
        Some(sub) => join(&[category, label, sub]),
        None => join(&[category, label]),
    }
}

/// Build a dynamic-text anchor name
///
/// The role and sub-variant segments are left out when absent or empty.
pub fn text_name(description: &str, role: Option<&str>, sub_variant: Option<&str>) -> String {
    let mut parts = vec![description];
    parts.extend(role.filter(|r| !r.is_empty()));
    parts.extend(sub_variant.filter(|s| !s.is_empty()));
    join(&parts)
}

/// Drop the final segment of a name, if it has more than one
pub fn generalize(name: &str) -> Option<&str> {
    name.rsplit_once(SEPARATOR).map(|(head, _)| head)
}

fn join(parts: &[&str]) -> String {
    parts.join(SEPARATOR)
}
