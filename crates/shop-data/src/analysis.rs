//! Log analysis pipeline.
//!
//! Loads one daily log (or every log of a group), aggregates it and returns a
//! [`LogReport`] ready for export.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use shop_core::classify::ClassifierConfig;
use shop_core::error::{Result, ShopError};
use shop_core::models::Message;
use tracing::{info, warn};

use crate::aggregator::{Aggregation, SalesAggregator};
use crate::reader::{find_log_files, LogParser};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside a report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Log file the report was built from.
    pub source: PathBuf,
    /// ISO-8601 timestamp when this report was generated.
    pub generated_at: String,
    pub lines_read: usize,
    pub blank_lines: usize,
    pub malformed_lines: usize,
    /// Number of valid messages.
    pub messages: usize,
    /// Number of rows in the expanded table.
    pub expanded_rows: usize,
    /// Wall-clock seconds spent reading and parsing the file.
    pub load_time_seconds: f64,
}

/// Everything produced for one log file.
#[derive(Debug, Clone, Serialize)]
pub struct LogReport {
    pub metadata: ReportMetadata,
    /// Base table: one entry per valid line.
    pub messages: Vec<Message>,
    pub aggregation: Aggregation,
}

impl LogReport {
    /// Stem of the source file, normally the `YYYY-MM-DD` date of the log.
    pub fn label(&self) -> String {
        self.metadata
            .source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "log".to_string())
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Parse and aggregate the log at `path`.
pub fn analyze_log(path: &Path, config: ClassifierConfig) -> Result<LogReport> {
    let load_start = std::time::Instant::now();
    let parsed = LogParser::new(config).load_file(path)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let aggregation = SalesAggregator::new(config).aggregate(&parsed.messages);
    let expanded_rows = aggregation.tables().map(|t| t.rows.len()).unwrap_or(0);

    let metadata = ReportMetadata {
        source: path.to_path_buf(),
        generated_at: Utc::now().to_rfc3339(),
        lines_read: parsed.stats.lines_read,
        blank_lines: parsed.stats.blank_lines,
        malformed_lines: parsed.stats.malformed_lines,
        messages: parsed.messages.len(),
        expanded_rows,
        load_time_seconds: load_time,
    };

    info!(
        "Analysed {}: {} messages, {} rows",
        path.display(),
        metadata.messages,
        metadata.expanded_rows
    );

    Ok(LogReport {
        metadata,
        messages: parsed.messages,
        aggregation,
    })
}

/// Analyse every daily log under `dir`, one independent report per file.
///
/// Files that fail to load are logged and skipped. Fails only when the
/// directory holds no log files at all.
pub fn analyze_group(dir: &Path, config: ClassifierConfig) -> Result<Vec<LogReport>> {
    let files = find_log_files(dir);
    if files.is_empty() {
        return Err(ShopError::NoLogFiles(dir.to_path_buf()));
    }

    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        match analyze_log(file, config) {
            Ok(report) => reports.push(report),
            Err(e) => warn!("Skipping {}: {}", file.display(), e),
        }
    }

    Ok(reports)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
