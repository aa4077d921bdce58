use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::debug;

use crate::models::Attachment;

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\[.*?(?:archivo guardado|file saved)[:\s]*([0-9]+)\.\w+\]")
            .expect("regex is valid")
    })
}

/// Find a saved-file marker such as `[archivo guardado: 1729187892000.jpg]`
/// and decode its millisecond Unix timestamp.
///
/// Returns `None` when the text has no marker. A marker whose digits cannot be
/// turned into an instant still yields an [`Attachment`] with `timestamp: None`.
pub fn find_attachment(text: &str) -> Option<Attachment> {
    let caps = marker_regex().captures(text)?;
    let millis = caps[1].to_string();
    let timestamp = millis_to_datetime(&millis);
    if timestamp.is_none() {
        debug!("Attachment marker with unusable timestamp {:?}", millis);
    }
    Some(Attachment { millis, timestamp })
}

/// Convert a decimal string of milliseconds since the epoch to UTC.
pub fn millis_to_datetime(digits: &str) -> Option<DateTime<Utc>> {
    let millis: i64 = digits.parse().ok()?;
    DateTime::from_timestamp_millis(millis)
}
