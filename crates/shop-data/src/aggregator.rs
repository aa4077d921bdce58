//! Expansion of parsed messages into per-token rows, and the two summary
//! tables built from them.

use std::collections::BTreeMap;

use serde::Serialize;
use shop_core::classify::{ClassifierConfig, TokenClassifier};
use shop_core::models::{ExpandedRow, Message, RowKind, SizeMentionCount, UserPriceTotal};

// ── SalesTables ───────────────────────────────────────────────────────────────

/// Everything derived from a non-empty expanded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesTables {
    /// One row per size/price token (and per attachment), in message order.
    pub rows: Vec<ExpandedRow>,
    /// Per-user price sums sorted by user. Every user appears once, whatever
    /// their name.
    pub user_totals: Vec<UserPriceTotal>,
    /// Sum of all price rows; equals the sum of `user_totals`.
    pub grand_total: u128,
    /// Mentions per size, ascending by size.
    pub size_counts: Vec<SizeMentionCount>,
}

/// Result of aggregating one log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Aggregation {
    /// No size, price or attachment rows anywhere in the log.
    Empty,
    Tables(SalesTables),
}

impl Aggregation {
    pub fn is_empty(&self) -> bool {
        matches!(self, Aggregation::Empty)
    }

    pub fn tables(&self) -> Option<&SalesTables> {
        match self {
            Aggregation::Empty => None,
            Aggregation::Tables(t) => Some(t),
        }
    }
}

// ── SalesAggregator ───────────────────────────────────────────────────────────

/// Builds the expanded table and its summaries for a sequence of messages.
#[derive(Debug, Clone, Default)]
pub struct SalesAggregator {
    classifier: TokenClassifier,
}

impl SalesAggregator {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            classifier: TokenClassifier::new(config),
        }
    }

    /// One row per classified token: for each message its sizes, then its
    /// prices, then its attachment row when one was found.
    pub fn expand(&self, messages: &[Message]) -> Vec<ExpandedRow> {
        let mut rows = Vec::new();

        for message in messages {
            let tokens = self.classifier.classify_text(&message.text);
            for &size in &tokens.sizes {
                rows.push(ExpandedRow::from_message(message, RowKind::Size, Some(size)));
            }
            for &price in &tokens.prices {
                rows.push(ExpandedRow::from_message(message, RowKind::Price, Some(price)));
            }
            if message.attachment.is_some() {
                rows.push(ExpandedRow::from_message(message, RowKind::Attachment, None));
            }
        }

        rows
    }

    /// Sum price rows per user, sorted by user name. Users without prices
    /// get no entry.
    pub fn user_totals(rows: &[ExpandedRow]) -> Vec<UserPriceTotal> {
        let mut by_user: BTreeMap<&str, u128> = BTreeMap::new();
        for row in rows.iter().filter(|r| r.kind == RowKind::Price) {
            *by_user.entry(row.user.as_str()).or_default() += u128::from(row.value.unwrap_or(0));
        }

        by_user
            .into_iter()
            .map(|(user, total)| UserPriceTotal {
                user: user.to_string(),
                total,
            })
            .collect()
    }

    /// Sum of the per-user totals.
    pub fn grand_total(totals: &[UserPriceTotal]) -> u128 {
        totals.iter().map(|t| t.total).sum()
    }

    /// Count size rows per size value, ascending by size.
    pub fn size_counts(rows: &[ExpandedRow]) -> Vec<SizeMentionCount> {
        let mut counts: BTreeMap<u64, usize> = BTreeMap::new();
        for row in rows.iter().filter(|r| r.kind == RowKind::Size) {
            if let Some(size) = row.value {
                *counts.entry(size).or_default() += 1;
            }
        }
        counts
            .into_iter()
            .map(|(size, mentions)| SizeMentionCount { size, mentions })
            .collect()
    }

    /// Expand `messages` and summarise them, or report [`Aggregation::Empty`]
    /// when nothing was found.
    pub fn aggregate(&self, messages: &[Message]) -> Aggregation {
        let rows = self.expand(messages);
        if rows.is_empty() {
            return Aggregation::Empty;
        }

        let user_totals = Self::user_totals(&rows);
        let grand_total = Self::grand_total(&user_totals);
        let size_counts = Self::size_counts(&rows);

        Aggregation::Tables(SalesTables {
            rows,
            user_totals,
            grand_total,
            size_counts,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
