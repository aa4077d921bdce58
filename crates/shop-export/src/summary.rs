//! Plain-text run summary printed after a report is written.

use std::fmt::Write as _;

use shop_core::formatting::{format_amount, pad_right};
use shop_core::models::GRAND_TOTAL_LABEL;
use shop_data::aggregator::Aggregation;
use shop_data::analysis::LogReport;

/// Human-readable summary of one report.
///
/// Lists per-user price totals (grand total last), the sizes mentioned and
/// how many lines were skipped.
pub fn render_summary(report: &LogReport) -> String {
    let meta = &report.metadata;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}: {} messages ({} lines, {} blank, {} skipped)",
        report.label(),
        meta.messages,
        meta.lines_read,
        meta.blank_lines,
        meta.malformed_lines
    );

    let tables = match &report.aggregation {
        Aggregation::Empty => {
            out.push_str("No sizes or prices detected.\n");
            return out;
        }
        Aggregation::Tables(t) => t,
    };

    let width = tables
        .user_totals
        .iter()
        .map(|t| t.user.chars().count())
        .chain(std::iter::once(GRAND_TOTAL_LABEL.len()))
        .max()
        .unwrap_or(0);

    out.push_str("Price totals:\n");
    for total in &tables.user_totals {
        let _ = writeln!(
            out,
            "  {}  {}",
            pad_right(&total.user, width),
            format_amount(total.total)
        );
    }
    let _ = writeln!(
        out,
        "  {}  {}",
        pad_right(GRAND_TOTAL_LABEL, width),
        format_amount(tables.grand_total)
    );

    if tables.size_counts.is_empty() {
        out.push_str("No sizes detected.\n");
    } else {
        let sizes: Vec<String> = tables
            .size_counts
            .iter()
            .map(|c| format!("{}×{}", c.size, c.mentions))
            .collect();
        let _ = writeln!(
            out,
            "Sizes ({} distinct): {}",
            tables.size_counts.len(),
            sizes.join(", ")
        );
    }

    out
}
