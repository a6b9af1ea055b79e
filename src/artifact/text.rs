//! Dynamic text lookup

use std::collections::HashMap;

use log::trace;

use crate::anchor;
use crate::error::PlacementError;

use super::ContentLoader;

/// Dynamic text keyed by (possibly generalized) bare anchor name
pub type DynamicText = HashMap<String, String>;

/// Find the text to render for a bare anchor name
///
/// Lookup order:
/// 1. `bare_name` in `dynamic_text`
/// 2. `bare_name` with trailing segments dropped one at a time
///    (`name__buyer__x`, then `name__buyer`, then `name`)
/// 3. the loader's text for `bare_name`
pub fn resolve_text<L>(
    bare_name: &str,
    dynamic_text: &DynamicText,
    loader: &L,
) -> Result<String, PlacementError>
where
    L: ContentLoader + ?Sized,
{
    let mut key = Some(bare_name);
    while let Some(candidate) = key {
        if let Some(text) = dynamic_text.get(candidate) {
            trace!("text for '{}' found under '{}'", bare_name, candidate);
            return Ok(text.clone());
        }
        key = anchor::generalize(candidate);
    }

    trace!("text for '{}' falls back to the loader", bare_name);
    loader
        .load_text(bare_name)
        .map_err(|e| PlacementError::content(bare_name, e))
}
