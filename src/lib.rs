//! Signhere - stamp signatures and dynamic text onto PDF anchor points
//!
//! A template document defines anchor points per page. Each anchor is named
//! `{category}__{label}` (optionally `__{sub_variant}`); the category picks
//! placement settings from a [`PlacementSettings`] table and decides whether
//! the anchor is filled with an image or with text.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//!
//! use signhere::{place_all, MapLoader, PageAnchors, PlacementOptions, PlacementSettings};
//!
//! let settings = PlacementSettings::from_str(r#"
//!     [signature]
//!     max_x = 120
//!     max_y = 40
//! "#).unwrap();
//!
//! let mut page = PageAnchors::new();
//! page.insert("signature__buyer".to_string(), vec![(72.0, 640.0)]);
//! page.insert("date__buyer".to_string(), vec![(300.0, 650.0)]);
//!
//! let loader = MapLoader::new().with_entry("signature__buyer", std::fs::read("buyer.png").unwrap());
//! let text = HashMap::from([("date".to_string(), "2019-09-12".to_string())]);
//!
//! let template = std::fs::read("contract.pdf").unwrap();
//! let signed = place_all(&template, &[page], &loader, &text, &settings, &PlacementOptions::default()).unwrap();
//! std::fs::write("signed.pdf", signed).unwrap();
//! ```

pub mod anchor;
pub mod artifact;
pub mod compositor;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod job;
pub mod settings;

pub use anchor::{SEPARATOR, TEXT_CATEGORY};
pub use artifact::{ContentLoader, DynamicText, MapLoader};
pub use compositor::{PageSurface, PdfDocument, TextStyle};
pub use driver::{place_on, PageAnchors, PlacementMap, PlacementSummary};
pub use error::{LoaderError, PlacementError};
pub use geometry::{Point, Rect};
pub use job::{Job, JobError};
pub use settings::{
    CategorySettings, PlacementSettings, Settings, SettingsOverride, UnknownCategoryPolicy,
};

use regex::Regex;

/// Options for one placement pass
#[derive(Debug, Clone, Default)]
pub struct PlacementOptions {
    /// Only anchors whose name matches (anywhere) are placed
    pub name_filter: Option<Regex>,
    /// Only these 1-based page numbers are placed; empty means all pages
    pub page_filter: Option<Vec<u32>>,
    /// Treatment of categories missing from the settings table
    pub unknown_category: UnknownCategoryPolicy,
    /// Font and box used for text anchors
    pub text_style: TextStyle,
}

impl PlacementOptions {
    /// Create options that place everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict placement to anchor names matching `filter`
    pub fn with_name_filter(mut self, filter: Regex) -> Self {
        self.name_filter = Some(filter);
        self
    }

    /// Restrict placement to anchor names matching the pattern
    pub fn with_name_pattern(self, pattern: &str) -> Result<Self, PlacementError> {
        Ok(self.with_name_filter(Regex::new(pattern)?))
    }

    /// Restrict placement to the given 1-based page numbers
    pub fn with_page_filter(mut self, pages: Vec<u32>) -> Self {
        self.page_filter = Some(pages);
        self
    }

    /// Set the unknown category policy
    pub fn with_unknown_category(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.unknown_category = policy;
        self
    }

    /// Set the text style
    pub fn with_text_style(mut self, style: TextStyle) -> Self {
        self.text_style = style;
        self
    }

    /// Whether the 0-based page index passes the page filter
    pub fn includes_page(&self, page: usize) -> bool {
        match &self.page_filter {
            Some(pages) if !pages.is_empty() => pages.iter().any(|&p| p as usize == page + 1),
            _ => true,
        }
    }

    /// Whether the anchor name passes the name filter
    pub fn includes_name(&self, name: &str) -> bool {
        self.name_filter
            .as_ref()
            .map_or(true, |filter| filter.is_match(name))
    }
}

/// Stamp artifacts into a copy of `initial_document` and return the new document
///
/// `initial_document` is parsed into a fresh document; the caller's bytes are
/// never touched. Any failure aborts the whole pass.
pub fn place_all<L>(
    initial_document: &[u8],
    placement_map: &[PageAnchors],
    loader: &L,
    dynamic_text: &DynamicText,
    settings: &PlacementSettings,
    options: &PlacementOptions,
) -> Result<Vec<u8>, PlacementError>
where
    L: ContentLoader + ?Sized,
{
    let mut document =
        PdfDocument::load(initial_document)?.with_text_style(options.text_style.clone());
    place_on(
        &mut document,
        placement_map,
        loader,
        dynamic_text,
        settings,
        options,
    )?;
    document.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_include_everything() {
        let options = PlacementOptions::default();
        assert!(options.includes_page(0));
        assert!(options.includes_page(63));
        assert!(options.includes_name("signature__buyer"));
    }

    #[test]
    fn test_page_filter_is_one_based() {
        let options = PlacementOptions::new().with_page_filter(vec![1, 3]);
        assert!(options.includes_page(0));
        assert!(!options.includes_page(1));
        assert!(options.includes_page(2));
    }

    #[test]
    fn test_empty_page_filter_includes_everything() {
        let options = PlacementOptions::new().with_page_filter(vec![]);
        assert!(options.includes_page(5));
    }

    #[test]
    fn test_name_filter_searches_anywhere() {
        let options = PlacementOptions::new()
            .with_name_pattern("notary")
            .unwrap();
        assert!(options.includes_name("signature__notary"));
        assert!(options.includes_name("notary__stamp__small"));
        assert!(!options.includes_name("signature__buyer"));
    }

    #[test]
    fn test_invalid_name_pattern() {
        let err = PlacementOptions::new().with_name_pattern("(").unwrap_err();
        assert!(matches!(err, PlacementError::InvalidNameFilter(_)));
    }

    #[test]
    fn test_place_all_rejects_garbage_document() {
        let err = place_all(
            b"not a pdf",
            &[],
            &MapLoader::new(),
            &DynamicText::new(),
            &PlacementSettings::new(),
            &PlacementOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PlacementError::Pdf(_)));
    }
}
