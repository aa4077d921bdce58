use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label of the grand-total line in exported tables. Only used when
/// rendering; the grand total is never stored as a user row.
pub const GRAND_TOTAL_LABEL: &str = "TOTAL";

/// Type marker written on every per-user total row in the sales sheet.
pub const TOTAL_ROW_TYPE: &str = "TOTAL_USER";

/// Type marker of the grand-total row in the sales sheet.
pub const GRAND_TOTAL_ROW_TYPE: &str = "GRAND_TOTAL";

/// File attachment referenced by a chat message, e.g.
/// `[archivo guardado: 1729187892000.jpg]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Raw millisecond digits captured from the marker.
    pub millis: String,
    /// Absolute time of the attachment, `None` when the digits do not form a
    /// representable instant.
    pub timestamp: Option<DateTime<Utc>>,
}

/// A single chat line of the form `YYYY-MM-DD HH:MM:SS User: text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Date exactly as written in the log, `YYYY-MM-DD`.
    pub date: String,
    /// Clock time exactly as written in the log, `HH:MM:SS`.
    pub time: String,
    /// Sender name (everything before the first `": "`).
    pub user: String,
    /// Message body.
    pub text: String,
    /// `date` + `time` as a naive datetime, `None` if they are not a real
    /// calendar instant (e.g. `2024-13-40`).
    pub derived_timestamp: Option<NaiveDateTime>,
    /// Attachment marker found in the text, when extraction is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

/// Kind of a row in the expanded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Size,
    Price,
    Attachment,
}

impl RowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowKind::Size => "size",
            RowKind::Price => "price",
            RowKind::Attachment => "attachment",
        }
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified token (or attachment) together with its message context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedRow {
    pub date: String,
    pub time: String,
    pub user: String,
    pub kind: RowKind,
    /// Token value; always `Some` for sizes and prices, `None` for attachments.
    pub value: Option<u64>,
    /// Full text of the source message.
    pub message: String,
    pub derived_timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub attachment_timestamp: Option<DateTime<Utc>>,
}

impl ExpandedRow {
    /// Build a row for `message` with the message context filled in.
    pub fn from_message(message: &Message, kind: RowKind, value: Option<u64>) -> Self {
        Self {
            date: message.date.clone(),
            time: message.time.clone(),
            user: message.user.clone(),
            kind,
            value,
            message: message.text.clone(),
            derived_timestamp: message.derived_timestamp,
            attachment_timestamp: message.attachment.as_ref().and_then(|a| a.timestamp),
        }
    }
}

/// Sum of price values for one user. Accumulated in `u128` so that sums of
/// `u64` prices cannot overflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPriceTotal {
    pub user: String,
    pub total: u128,
}

/// Number of size rows mentioning a given size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeMentionCount {
    pub size: u64,
    pub mentions: usize,
}
