//! Similarity measures between feature vectors and colours.

use shop_core::error::{Result, ShopError};

use crate::features::ImageFeatures;

/// Default weight of the shape term in [`blended_similarity`].
pub const DEFAULT_ALPHA: f64 = 0.8;

/// Cosine of the angle between `a` and `b`; 0 when either norm is 0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    check_dims(a.len(), b.len())?;
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a * norm_b))
}

pub fn euclidean_distance(a: &[f64], b: &[f64]) -> Result<f64> {
    check_dims(a.len(), b.len())?;
    Ok(a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt())
}

/// `alpha * cosine(shape) + (1 - alpha) * 1 / (1 + euclidean(colour))`.
pub fn blended_similarity(
    image: &ImageFeatures,
    prototype: &ImageFeatures,
    alpha: f64,
) -> Result<f64> {
    let shape = cosine_similarity(&image.vector, &prototype.vector)?;
    let color = 1.0 / (1.0 + euclidean_distance(&image.color, &prototype.color)?);
    Ok(alpha * shape + (1.0 - alpha) * color)
}

fn check_dims(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(ShopError::DimensionMismatch { expected, found });
    }
    Ok(())
}
