//! Data ingestion layer for the shop tools.
//!
//! Responsible for discovering and parsing daily chat logs, expanding messages
//! into size/price rows, and running the per-file analysis pipeline.

pub mod aggregator;
pub mod analysis;
pub mod reader;

pub use shop_core as core;
