//! Placement driver
//!
//! Walks the placement map page by page and stamps every anchor occurrence
//! that survives the page and name filters.

use indexmap::IndexMap;
use log::{debug, info};

use crate::artifact::{resolve_image, resolve_text, ContentLoader, DynamicText};
use crate::compositor::{add_image, add_text, PageSurface};
use crate::error::PlacementError;
use crate::geometry::{check_rect, image_rectangle, rectangle, Point, Rect};
use crate::settings::{resolve, ArtifactKind, PlacementSettings, ResolvedAnchor};
use crate::PlacementOptions;

/// Anchor name to the raw coordinates it is stamped at, for one page
///
/// Anchors are stamped in insertion order, so a later anchor draws on top of
/// an earlier one.
pub type PageAnchors = IndexMap<String, Vec<(f64, f64)>>;

/// One entry per page, in page order
pub type PlacementMap = Vec<PageAnchors>;

/// Counts from one placement pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementSummary {
    /// Pages that received at least one anchor
    pub pages: usize,
    /// Anchors resolved
    pub anchors: usize,
    /// Individual stamps written
    pub placements: usize,
}

/// Stamp every anchor of `placement_map` onto `surface`
///
/// The first failure aborts the pass.
pub fn place_on<S, L>(
    surface: &mut S,
    placement_map: &[PageAnchors],
    loader: &L,
    dynamic_text: &DynamicText,
    settings: &PlacementSettings,
    options: &PlacementOptions,
) -> Result<PlacementSummary, PlacementError>
where
    S: PageSurface + ?Sized,
    L: ContentLoader + ?Sized,
{
    let mut summary = PlacementSummary::default();

    for (page, anchors) in placement_map.iter().enumerate() {
        if anchors.is_empty() || !options.includes_page(page) {
            continue;
        }

        let mut touched = false;
        for (name, coords) in anchors {
            if !options.includes_name(name) {
                debug!("skipping anchor '{}' on page {}", name, page + 1);
                continue;
            }

            let resolved = resolve(name, settings, options.unknown_category)?;
            let rects = placement_rects(page, &resolved, coords, options)?;
            place_anchor(surface, page, &resolved, &rects, loader, dynamic_text)?;

            touched = true;
            summary.anchors += 1;
            summary.placements += rects.len();
        }
        if touched {
            summary.pages += 1;
        }
    }

    info!(
        "placed {} stamps for {} anchors on {} pages",
        summary.placements, summary.anchors, summary.pages
    );
    Ok(summary)
}

/// Compute and validate every rectangle of an anchor before anything is written
fn placement_rects(
    page: usize,
    resolved: &ResolvedAnchor,
    coords: &[(f64, f64)],
    options: &PlacementOptions,
) -> Result<Vec<Rect>, PlacementError> {
    let (text_width, text_height) = options.text_style.box_size;
    coords
        .iter()
        .map(|&coord| -> Result<Rect, PlacementError> {
            let raw = Point::from(coord);
            let rect = match resolved.kind {
                ArtifactKind::Text => rectangle(raw, &resolved.settings, text_width, text_height),
                ArtifactKind::Image => image_rectangle(raw, &resolved.settings),
            };
            check_rect(page as i64, rect)?;
            Ok(rect)
        })
        .collect()
}

fn place_anchor<S, L>(
    surface: &mut S,
    page: usize,
    resolved: &ResolvedAnchor,
    rects: &[Rect],
    loader: &L,
    dynamic_text: &DynamicText,
) -> Result<(), PlacementError>
where
    S: PageSurface + ?Sized,
    L: ContentLoader + ?Sized,
{
    match resolved.kind {
        ArtifactKind::Text => {
            let text = resolve_text(&resolved.bare_name, dynamic_text, loader)?;
            for rect in rects {
                add_text(surface, page as i64, *rect, &text)?;
            }
        }
        ArtifactKind::Image => {
            let image = resolve_image(&resolved.bare_name, loader)?;
            for rect in rects {
                add_image(surface, page as i64, *rect, &image)?;
            }
        }
    }
    Ok(())
}
