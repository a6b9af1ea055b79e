//! Error types for the placement pass

use thiserror::Error;

/// Boxed error returned by content loaders
pub type LoaderError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while stamping artifacts into a document
#[derive(Debug, Error)]
pub enum PlacementError {
    /// Negative page index or coordinate handed to a placement call
    #[error("invalid placement: {reason}")]
    InvalidPlacement { reason: String },

    /// Page index past the end of the document
    #[error("page index {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },

    /// Category not declared in the settings table under the strict policy
    #[error("category '{category}' is not declared in the placement settings (declared: {})", .declared.join(", "))]
    UnknownCategory {
        category: String,
        declared: Vec<String>,
    },

    /// Image category resolved without a usable target box
    #[error("image category '{category}' needs positive max_x and max_y")]
    MissingImageBox { category: String },

    /// The content loader could not produce content for a name
    #[error("could not load content for '{name}': {source}")]
    Content {
        name: String,
        #[source]
        source: LoaderError,
    },

    /// Loaded image content could not be decoded or re-encoded
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The document engine failed
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// The anchor name filter is not a valid pattern
    #[error("invalid name filter: {0}")]
    InvalidNameFilter(#[from] regex::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlacementError {
    /// Create an invalid placement error
    pub fn invalid_placement(reason: impl Into<String>) -> Self {
        Self::InvalidPlacement {
            reason: reason.into(),
        }
    }

    /// Create an unknown category error listing the declared categories, sorted
    pub fn unknown_category<'a>(
        category: impl Into<String>,
        declared: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut declared: Vec<String> = declared.into_iter().map(String::from).collect();
        declared.sort();
        Self::UnknownCategory {
            category: category.into(),
            declared,
        }
    }

    /// Wrap a loader failure for the given content name
    pub fn content(name: impl Into<String>, source: LoaderError) -> Self {
        Self::Content {
            name: name.into(),
            source,
        }
    }

    /// Whether this error was caused by caller input rather than the document or content
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidPlacement { .. } | Self::PageOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_placement_display() {
        let err = PlacementError::invalid_placement("x must be non-negative");
        assert_eq!(err.to_string(), "invalid placement: x must be non-negative");
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_content_error_keeps_source() {
        let err = PlacementError::content("signature__buyer", "missing file".into());
        assert!(err.to_string().contains("signature__buyer"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn test_unknown_category_display() {
        let err = PlacementError::unknown_category("stamp", ["text", "signature"]);
        assert_eq!(
            err.to_string(),
            "category 'stamp' is not declared in the placement settings (declared: signature, text)"
        );
    }
}
