//! Artifact content resolution
//!
//! Content is supplied by the caller through a [`ContentLoader`]. Text anchors
//! first consult a dynamic-text map and only fall back to the loader; image
//! anchors always go through the loader and are cropped to their ink.

pub mod image;
pub mod text;

pub use self::image::{ink_bounds, normalize_image, resolve_image};
pub use self::text::{resolve_text, DynamicText};

use std::collections::HashMap;

use crate::error::LoaderError;

/// Supplies raw content for a bare anchor name
pub trait ContentLoader {
    /// Load raw bytes (usually an encoded image) for `name`
    fn load(&self, name: &str) -> Result<Vec<u8>, LoaderError>;

    /// Load literal text for `name`
    ///
    /// The default decodes [`load`](Self::load) output as UTF-8.
    fn load_text(&self, name: &str) -> Result<String, LoaderError> {
        let bytes = self.load(name)?;
        Ok(String::from_utf8(bytes)?)
    }
}

impl<F> ContentLoader for F
where
    F: Fn(&str) -> Result<Vec<u8>, LoaderError>,
{
    fn load(&self, name: &str) -> Result<Vec<u8>, LoaderError> {
        self(name)
    }
}

/// Loader backed by an in-memory map of names to bytes
#[derive(Debug, Clone, Default)]
pub struct MapLoader {
    entries: HashMap<String, Vec<u8>>,
}

impl MapLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), bytes.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

impl ContentLoader for MapLoader {
    fn load(&self, name: &str) -> Result<Vec<u8>, LoaderError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| format!("no content named '{}'", name).into())
    }
}
