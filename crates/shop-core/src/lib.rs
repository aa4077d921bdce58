//! Core domain types for the shop tools.
//!
//! Holds the chat-log data model, number classification rules, attachment
//! marker decoding, CLI settings, timezone helpers and the shared error type.

pub mod attachment;
pub mod classify;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{Result, ShopError};
