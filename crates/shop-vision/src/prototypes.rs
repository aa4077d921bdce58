//! Per-class prototypes: the mean features of every labelled image in a class.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shop_core::error::{Result, ShopError};
use tracing::{debug, info, warn};

use crate::features::{display_name, list_images, FeatureExtractor, ImageFeatures};

/// Class name to averaged features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrototypeSet {
    pub classes: BTreeMap<String, ImageFeatures>,
}

impl PrototypeSet {
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ShopError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Build one prototype per sub-directory of `dataset`.
///
/// Images that fail extraction, contain NaN, or disagree in dimension with
/// the first usable image of their class are skipped. Classes left without
/// images are omitted, so every saved prototype is finite JSON.
pub fn build_prototypes(dataset: &Path, extractor: &dyn FeatureExtractor) -> Result<PrototypeSet> {
    let mut class_dirs: Vec<_> = walkdir::WalkDir::new(dataset)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .collect();
    class_dirs.sort();

    let mut set = PrototypeSet::default();
    for dir in class_dirs {
        let class = display_name(&dir);
        let mut samples: Vec<ImageFeatures> = Vec::new();
        for image in list_images(&dir)? {
            match extractor.features(&image) {
                Ok(f) if f.has_nan() => {
                    warn!("Skipping {}: features contain NaN", image.display());
                }
                Ok(f) => {
                    if let Some(first) = samples.first() {
                        if first.vector.len() != f.vector.len() {
                            warn!(
                                "Skipping {}: {} dims, class {} uses {}",
                                image.display(),
                                f.vector.len(),
                                class,
                                first.vector.len()
                            );
                            continue;
                        }
                    }
                    samples.push(f);
                }
                Err(e) => warn!("Skipping {}: {}", image.display(), e),
            }
        }

        match mean_features(&samples) {
            Some(prototype) => {
                debug!("Class {}: {} images", class, samples.len());
                set.classes.insert(class, prototype);
            }
            None => warn!("Class {} has no usable images, omitted", class),
        }
    }

    info!("Built {} prototypes from {}", set.len(), dataset.display());
    Ok(set)
}

/// Element-wise mean of vectors and colours. Callers ensure equal dimensions.
fn mean_features(samples: &[ImageFeatures]) -> Option<ImageFeatures> {
    let first = samples.first()?;
    let n = samples.len() as f64;
    let mut vector = vec![0.0; first.vector.len()];
    let mut color = [0.0; 3];
    for s in samples {
        for (acc, v) in vector.iter_mut().zip(&s.vector) {
            *acc += v;
        }
        for (acc, c) in color.iter_mut().zip(s.color) {
            *acc += c;
        }
    }
    vector.iter_mut().for_each(|v| *v /= n);
    color.iter_mut().for_each(|c| *c /= n);
    Some(ImageFeatures { vector, color })
}
