//! Image feature extraction seam.
//!
//! The pretrained model lives outside this crate. It is reached through the
//! [`FeatureExtractor`] trait, built once by the caller and passed by
//! reference into prototype building and classification.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shop_core::error::{Result, ShopError};

/// Extensions accepted as images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Whether `path` has one of the [`IMAGE_EXTENSIONS`].
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Shape descriptor and average colour of one image (or one class average).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFeatures {
    /// Deep feature vector produced by the model.
    pub vector: Vec<f64>,
    /// Mean RGB colour, each channel in 0–255.
    pub color: [f64; 3],
}

impl ImageFeatures {
    /// Whether any vector component or colour channel is NaN.
    pub fn has_nan(&self) -> bool {
        self.vector.iter().chain(self.color.iter()).any(|v| v.is_nan())
    }
}

/// Maps an image to its feature vector and average colour.
pub trait FeatureExtractor {
    fn extract(&self, image: &Path) -> Result<Vec<f64>>;

    fn average_color(&self, image: &Path) -> Result<[f64; 3]>;

    fn features(&self, image: &Path) -> Result<ImageFeatures> {
        Ok(ImageFeatures {
            vector: self.extract(image)?,
            color: self.average_color(image)?,
        })
    }
}

/// Features computed ahead of time and stored as JSON:
/// `{ "<file name>": { "vector": [...], "color": [r, g, b] } }`.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedFeatures {
    entries: HashMap<String, ImageFeatures>,
}

impl PrecomputedFeatures {
    pub fn from_map(entries: HashMap<String, ImageFeatures>) -> Self {
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ShopError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: HashMap<String, ImageFeatures> = serde_json::from_str(&content)?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up by full path first, then by file name.
    fn lookup(&self, image: &Path) -> Result<&ImageFeatures> {
        let full = image.to_string_lossy();
        if let Some(f) = self.entries.get(full.as_ref()) {
            return Ok(f);
        }
        image
            .file_name()
            .and_then(|n| self.entries.get(n.to_string_lossy().as_ref()))
            .ok_or_else(|| ShopError::MissingFeatures(display_name(image)))
    }
}

impl FeatureExtractor for PrecomputedFeatures {
    fn extract(&self, image: &Path) -> Result<Vec<f64>> {
        Ok(self.lookup(image)?.vector.clone())
    }

    fn average_color(&self, image: &Path) -> Result<[f64; 3]> {
        Ok(self.lookup(image)?.color)
    }
}

/// File name of `path` for reports, or the whole path when it has none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Image files directly inside `dir`, sorted by path.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ShopError::FileRead {
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }
    let mut images: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_image(e.path()))
        .map(|e| e.into_path())
        .collect();
    images.sort();
    Ok(images)
}
