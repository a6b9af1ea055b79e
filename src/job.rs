//! Job files
//!
//! A job bundles everything one placement pass needs apart from the template
//! document itself:
//!
//! ```toml
//! image_dir = "signatures"
//!
//! [settings.signature]
//! max_x = 120
//! max_y = 40
//!
//! [text]
//! date = "2019-09-12"
//!
//! [images]
//! signature__notary = "iVBORw0KGgo..."
//!
//! [[pages]]
//! anchors = { "signature__buyer" = [[72, 640]], "date__buyer" = [[300, 650]] }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::artifact::{ContentLoader, DynamicText};
use crate::driver::{PageAnchors, PlacementMap};
use crate::error::LoaderError;
use crate::settings::PlacementSettings;

/// Errors that can occur when loading a job file
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Failed to read job file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse job TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Inline image '{name}' is not valid base64: {source}")]
    InvalidImage {
        name: String,
        source: base64::DecodeError,
    },
}

#[derive(Debug, Default, Deserialize)]
struct RawJob {
    #[serde(default)]
    settings: PlacementSettings,
    #[serde(default)]
    text: DynamicText,
    image_dir: Option<PathBuf>,
    #[serde(default)]
    images: HashMap<String, String>,
    #[serde(default)]
    pages: Vec<RawPage>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPage {
    #[serde(default)]
    anchors: PageAnchors,
}

/// A parsed job
#[derive(Debug, Clone, Default)]
pub struct Job {
    pub settings: PlacementSettings,
    pub text: DynamicText,
    pub pages: PlacementMap,
    pub loader: JobLoader,
}

impl Job {
    /// Load a job from a TOML file
    ///
    /// A relative `image_dir` is taken relative to the job file.
    pub fn from_file(path: &Path) -> Result<Self, JobError> {
        let content = std::fs::read_to_string(path)?;
        let mut job = Self::from_str(&content)?;
        if let (Some(dir), Some(base)) = (job.loader.image_dir.as_mut(), path.parent()) {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        Ok(job)
    }

    /// Load a job from a TOML string
    pub fn from_str(content: &str) -> Result<Self, JobError> {
        let raw: RawJob = toml::from_str(content)?;

        let images = raw
            .images
            .into_iter()
            .map(|(name, encoded)| match STANDARD.decode(encoded.trim()) {
                Ok(bytes) => Ok((name, bytes)),
                Err(source) => Err(JobError::InvalidImage { name, source }),
            })
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(Self {
            settings: raw.settings,
            text: raw.text,
            pages: raw.pages.into_iter().map(|page| page.anchors).collect(),
            loader: JobLoader {
                images,
                image_dir: raw.image_dir,
            },
        })
    }
}

/// Loader for a job's images: inline images first, then `<image_dir>/<name>.png`
#[derive(Debug, Clone, Default)]
pub struct JobLoader {
    images: HashMap<String, Vec<u8>>,
    image_dir: Option<PathBuf>,
}

impl JobLoader {
    pub fn image_dir(&self) -> Option<&Path> {
        self.image_dir.as_deref()
    }
}

impl ContentLoader for JobLoader {
    fn load(&self, name: &str) -> Result<Vec<u8>, LoaderError> {
        if let Some(bytes) = self.images.get(name) {
            return Ok(bytes.clone());
        }
        let Some(dir) = &self.image_dir else {
            return Err(format!("no inline image named '{}' and no image_dir", name).into());
        };
        let path = dir.join(format!("{}.png", name));
        debug!("loading '{}' from {}", name, path.display());
        std::fs::read(&path)
            .map_err(|e| LoaderError::from(format!("{}: {}", path.display(), e)))
    }
}
