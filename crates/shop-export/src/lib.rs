//! Export layer for the shop tools.
//!
//! Turns a [`shop_data::analysis::LogReport`] into sheets, writes them as CSV
//! or JSON, and renders the terminal summary.

pub mod sheets;
pub mod summary;
pub mod writer;

pub use shop_core as core;
