//! Effective settings resolution for a single anchor

use log::debug;

use crate::anchor::{self, TEXT_CATEGORY};
use crate::error::PlacementError;

use super::{PlacementSettings, Settings};

/// How to treat an anchor whose category is missing from the settings table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownCategoryPolicy {
    /// Place the anchor as dynamic text using the text category's settings
    #[default]
    TreatAsText,
    /// Fail the placement pass
    Reject,
}

/// Which resolution path an anchor takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Text,
    Image,
}

/// An anchor name resolved against a settings table
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAnchor {
    /// Content lookup key (sub-variant removed)
    pub bare_name: String,
    /// Category whose settings were applied
    pub category: String,
    /// Sub-variant whose settings were applied, if any
    pub sub_variant: Option<String>,
    pub kind: ArtifactKind,
    pub settings: Settings,
}

/// Resolve an anchor name to its content key, category, and effective settings
///
/// Merge order, later wins:
/// 1. baseline defaults ([`Settings::default`])
/// 2. the category's own fields
/// 3. the sub-variant's fields, when the name selects one
pub fn resolve(
    anchor_name: &str,
    table: &PlacementSettings,
    policy: UnknownCategoryPolicy,
) -> Result<ResolvedAnchor, PlacementError> {
    let (declared, _) = anchor::split(anchor_name);

    let category = if table.contains(declared) || declared == TEXT_CATEGORY {
        declared
    } else {
        match policy {
            UnknownCategoryPolicy::TreatAsText => TEXT_CATEGORY,
            UnknownCategoryPolicy::Reject => {
                return Err(PlacementError::unknown_category(declared, table.categories()));
            }
        }
    };

    let category_settings = table.get(category);
    let lookup = anchor::resolve_lookup_name(anchor_name, category_settings);

    let mut settings = Settings::default();
    if let Some(category_settings) = category_settings {
        category_settings.defaults.apply_to(&mut settings);
        if let Some(sub) = lookup
            .sub_variant
            .as_deref()
            .and_then(|s| category_settings.sub_variant(s))
        {
            sub.apply_to(&mut settings);
        }
    }

    let kind = if category == TEXT_CATEGORY {
        ArtifactKind::Text
    } else {
        ArtifactKind::Image
    };

    if kind == ArtifactKind::Image && (settings.max_x <= 0.0 || settings.max_y <= 0.0) {
        return Err(PlacementError::MissingImageBox {
            category: category.to_string(),
        });
    }

    debug!(
        "resolved anchor '{}' -> '{}' (category {}, sub-variant {:?})",
        anchor_name, lookup.bare_name, category, lookup.sub_variant
    );

    Ok(ResolvedAnchor {
        bare_name: lookup.bare_name,
        category: category.to_string(),
        sub_variant: lookup.sub_variant,
        kind,
        settings,
    })
}
