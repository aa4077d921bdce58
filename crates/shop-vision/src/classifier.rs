//! Nearest-prototype classification of shoe photos.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;
use shop_core::error::{Result, ShopError};
use shop_core::formatting::format_score;
use tracing::{debug, info, warn};

use crate::features::{display_name, list_images, FeatureExtractor, ImageFeatures};
use crate::prototypes::PrototypeSet;
use crate::scoring::blended_similarity;

/// Best-scoring class for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMatch {
    pub class: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Matched { class: String, score: f64 },
    Error { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageResult {
    pub file: String,
    pub outcome: Outcome,
}

/// Per-image outcomes in file order, plus match counts per class.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FolderClassification {
    pub results: Vec<ImageResult>,
    /// Sorted most common first, ties by class name.
    pub counts: Vec<(String, usize)>,
}

impl FolderClassification {
    pub fn errors(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Error { .. }))
            .count()
    }
}

pub struct ShoeClassifier {
    prototypes: PrototypeSet,
    alpha: f64,
}

impl ShoeClassifier {
    pub fn new(prototypes: PrototypeSet, alpha: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(ShopError::Config(format!(
                "alpha must be within [0, 1], got {}",
                alpha
            )));
        }
        if prototypes.is_empty() {
            return Err(ShopError::Config("prototype set is empty".to_string()));
        }
        Ok(Self { prototypes, alpha })
    }

    /// Highest blended similarity over all comparable prototypes.
    ///
    /// Prototypes with NaN components and prototypes of another dimension
    /// are skipped. `None` when nothing was comparable.
    pub fn classify(&self, features: &ImageFeatures) -> Option<ClassMatch> {
        let mut best: Option<ClassMatch> = None;
        for (class, prototype) in &self.prototypes.classes {
            if prototype.has_nan() {
                debug!("Prototype {} contains NaN, skipped", class);
                continue;
            }
            let score = match blended_similarity(features, prototype, self.alpha) {
                Ok(s) if !s.is_nan() => s,
                Ok(_) => continue,
                Err(e) => {
                    warn!("Prototype {}: {}", class, e);
                    continue;
                }
            };
            // Strict comparison keeps the alphabetically first class on ties.
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(ClassMatch {
                    class: class.clone(),
                    score,
                });
            }
        }
        best
    }

    pub fn classify_image(
        &self,
        image: &Path,
        extractor: &dyn FeatureExtractor,
    ) -> Result<ClassMatch> {
        let features = extractor.features(image)?;
        self.classify(&features)
            .ok_or_else(|| ShopError::NoPrototypeMatch(display_name(image)))
    }

    /// Classify every image directly inside `dir`. A failing image yields an
    /// [`Outcome::Error`] row; the batch always completes.
    pub fn classify_folder(
        &self,
        dir: &Path,
        extractor: &dyn FeatureExtractor,
    ) -> Result<FolderClassification> {
        let images = list_images(dir)?;
        let mut tally: HashMap<String, usize> = HashMap::new();
        let mut results = Vec::with_capacity(images.len());

        for image in &images {
            let file = display_name(image);
            let outcome = match self.classify_image(image, extractor) {
                Ok(m) => {
                    *tally.entry(m.class.clone()).or_insert(0) += 1;
                    Outcome::Matched {
                        class: m.class,
                        score: m.score,
                    }
                }
                Err(e) => {
                    warn!("Could not classify {}: {}", file, e);
                    Outcome::Error {
                        reason: e.to_string(),
                    }
                }
            };
            results.push(ImageResult { file, outcome });
        }

        let mut counts: Vec<(String, usize)> = tally.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        info!("Classified {} images in {}", results.len(), dir.display());
        Ok(FolderClassification { results, counts })
    }
}

/// Text report: one `name → class (score)` line per image, then a summary.
pub fn render_results(classification: &FolderClassification) -> String {
    let mut out = String::new();
    for r in &classification.results {
        match &r.outcome {
            Outcome::Matched { class, score } => {
                let _ = writeln!(out, "{} → {} ({})", r.file, class, format_score(*score));
            }
            Outcome::Error { reason } => {
                let _ = writeln!(out, "{} → ERROR ({})", r.file, reason);
            }
        }
    }
    out.push_str("\n=== SUMMARY ===\n");
    for (class, count) in &classification.counts {
        let _ = writeln!(out, "{}: {}", class, count);
    }
    let errors = classification.errors();
    if errors > 0 {
        let _ = writeln!(out, "errors: {}", errors);
    }
    out
}
