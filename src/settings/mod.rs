//! Placement settings
//!
//! A settings table maps each category to its placement rules. A category's
//! rules may contain named sub-variants that override some of its fields:
//!
//! ```toml
//! [signature]
//! max_x = 120
//! max_y = 40
//! y_offset = -30
//!
//! [signature.notary]
//! max_x = 80
//!
//! [text]
//! x_offset = 2
//! ```
//!
//! Resolution merges baseline defaults, category fields, and sub-variant
//! fields, in that order, into a fully populated [`Settings`].

mod resolver;

pub use resolver::{resolve, ArtifactKind, ResolvedAnchor, UnknownCategoryPolicy};

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a settings table
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse settings TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Effective placement settings with every field populated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Added to the scaled x coordinate
    pub x_offset: f64,
    /// Added to the scaled y coordinate
    pub y_offset: f64,
    /// Width of the image box
    pub max_x: f64,
    /// Height of the image box
    pub max_y: f64,
    /// Multiplies the raw x coordinate
    pub x_scalar: f64,
    /// Multiplies the raw y coordinate
    pub y_scalar: f64,
}

impl Default for Settings {
    /// Baseline values: no offset, no scaling, empty box
    fn default() -> Self {
        Self {
            x_offset: 0.0,
            y_offset: 0.0,
            max_x: 0.0,
            max_y: 0.0,
            x_scalar: 1.0,
            y_scalar: 1.0,
        }
    }
}

/// A partial set of placement fields; unset fields inherit from the broader tier
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct SettingsOverride {
    pub x_offset: Option<f64>,
    pub y_offset: Option<f64>,
    pub max_x: Option<f64>,
    pub max_y: Option<f64>,
    pub x_scalar: Option<f64>,
    pub y_scalar: Option<f64>,
}

impl SettingsOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.x_offset = Some(x);
        self.y_offset = Some(y);
        self
    }

    pub fn with_x_offset(mut self, x: f64) -> Self {
        self.x_offset = Some(x);
        self
    }

    pub fn with_y_offset(mut self, y: f64) -> Self {
        self.y_offset = Some(y);
        self
    }

    /// Set the image box size
    pub fn with_max(mut self, max_x: f64, max_y: f64) -> Self {
        self.max_x = Some(max_x);
        self.max_y = Some(max_y);
        self
    }

    pub fn with_max_x(mut self, max_x: f64) -> Self {
        self.max_x = Some(max_x);
        self
    }

    pub fn with_scalar(mut self, x: f64, y: f64) -> Self {
        self.x_scalar = Some(x);
        self.y_scalar = Some(y);
        self
    }

    /// Overwrite the fields of `settings` that this override sets
    pub fn apply_to(&self, settings: &mut Settings) {
        let fields = [
            (self.x_offset, &mut settings.x_offset),
            (self.y_offset, &mut settings.y_offset),
            (self.max_x, &mut settings.max_x),
            (self.max_y, &mut settings.max_y),
            (self.x_scalar, &mut settings.x_scalar),
            (self.y_scalar, &mut settings.y_scalar),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

/// Placement rules for one category
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CategorySettings {
    /// Fields applied to every anchor of the category
    #[serde(flatten)]
    pub defaults: SettingsOverride,
    /// Named overrides selected by an anchor's trailing segment
    #[serde(flatten)]
    pub sub_variants: HashMap<String, SettingsOverride>,
}

impl CategorySettings {
    pub fn new(defaults: SettingsOverride) -> Self {
        Self {
            defaults,
            sub_variants: HashMap::new(),
        }
    }

    /// Add a named sub-variant
    pub fn with_sub_variant(mut self, name: impl Into<String>, settings: SettingsOverride) -> Self {
        self.sub_variants.insert(name.into(), settings);
        self
    }

    pub fn has_sub_variant(&self, name: &str) -> bool {
        self.sub_variants.contains_key(name)
    }

    pub fn sub_variant(&self, name: &str) -> Option<&SettingsOverride> {
        self.sub_variants.get(name)
    }
}

/// Settings table keyed by category
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(transparent)]
pub struct PlacementSettings {
    categories: HashMap<String, CategorySettings>,
}

impl PlacementSettings {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a settings table from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a settings table from a TOML string
    pub fn from_str(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Declare a category
    pub fn with_category(mut self, name: impl Into<String>, settings: CategorySettings) -> Self {
        self.categories.insert(name.into(), settings);
        self
    }

    pub fn get(&self, category: &str) -> Option<&CategorySettings> {
        self.categories.get(category)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Declared category names
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(|k| k.as_str())
    }
}

impl From<HashMap<String, CategorySettings>> for PlacementSettings {
    fn from(categories: HashMap<String, CategorySettings>) -> Self {
        Self { categories }
    }
}
