//! Shoe photo classification by similarity to per-class prototypes.
//!
//! Features come from an injected [`features::FeatureExtractor`]; this crate
//! only averages, scores and reports.

pub mod classifier;
pub mod features;
pub mod prototypes;
pub mod scoring;

pub use shop_core as core;
