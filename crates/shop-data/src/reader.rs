//! Chat-log discovery and line parsing.
//!
//! Log files live under `<logs-root>/<group>/<YYYY-MM-DD>.txt` and hold one
//! message per line: `2024-01-05 10:15:00 Ana: Quiero el 38 en 250`.

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use shop_core::attachment::find_attachment;
use shop_core::classify::ClassifierConfig;
use shop_core::error::{Result, ShopError};
use shop_core::models::Message;
use shop_core::time_utils::combine_date_time;
use tracing::{debug, warn};

fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // User is the shortest prefix up to the first ": ".
    RE.get_or_init(|| {
        Regex::new(r"^([0-9]{4}-[0-9]{2}-[0-9]{2}) ([0-9]{2}:[0-9]{2}:[0-9]{2}) (.*?): (.*)")
            .expect("regex is valid")
    })
}

// ── Public types ──────────────────────────────────────────────────────────────

/// Line counters for one parsed log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub lines_read: usize,
    pub blank_lines: usize,
    /// Lines that did not match the message pattern or were not UTF-8.
    pub malformed_lines: usize,
}

/// Messages parsed from one log plus the line counters.
#[derive(Debug, Clone, Default)]
pub struct ParsedLog {
    pub messages: Vec<Message>,
    pub stats: ParseStats,
}

/// Turns chat-log lines into [`Message`]s.
#[derive(Debug, Clone, Default)]
pub struct LogParser {
    config: ClassifierConfig,
}

impl LogParser {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Parse a single line. Returns `None` for blank or malformed lines.
    pub fn parse_line(&self, line: &str) -> Option<Message> {
        let trimmed = line.trim_start_matches('\u{feff}').trim();
        if trimmed.is_empty() {
            return None;
        }
        let caps = line_regex().captures(trimmed)?;

        let date = caps[1].to_string();
        let time = caps[2].to_string();
        let user = caps[3].to_string();
        let text = caps[4].to_string();

        let derived_timestamp = combine_date_time(&date, &time);
        let attachment = if self.config.extract_attachments {
            find_attachment(&text)
        } else {
            None
        };

        Some(Message {
            date,
            time,
            user,
            text,
            derived_timestamp,
            attachment,
        })
    }

    /// Parse every line from `reader`.
    ///
    /// Blank and malformed lines are counted and skipped; only I/O failures
    /// are reported as errors.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> std::io::Result<ParsedLog> {
        let mut parsed = ParsedLog::default();

        for (idx, chunk) in reader.split(b'\n').enumerate() {
            let bytes = chunk?;
            parsed.stats.lines_read += 1;

            let line = match String::from_utf8(bytes) {
                Ok(l) => l,
                Err(_) => {
                    debug!("Line {}: not valid UTF-8, skipped", idx + 1);
                    parsed.stats.malformed_lines += 1;
                    continue;
                }
            };

            if line.trim_start_matches('\u{feff}').trim().is_empty() {
                parsed.stats.blank_lines += 1;
                continue;
            }

            match self.parse_line(&line) {
                Some(message) => parsed.messages.push(message),
                None => {
                    debug!("Line {}: does not match message pattern", idx + 1);
                    parsed.stats.malformed_lines += 1;
                }
            }
        }

        Ok(parsed)
    }

    /// Open and parse the log at `path`.
    pub fn load_file(&self, path: &Path) -> Result<ParsedLog> {
        if !path.exists() {
            return Err(ShopError::LogFileNotFound(path.to_path_buf()));
        }

        let file = std::fs::File::open(path).map_err(|source| ShopError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = self
            .parse_reader(std::io::BufReader::new(file))
            .map_err(|source| ShopError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(
            "File {}: {} lines, {} messages, {} blank, {} malformed",
            path.display(),
            parsed.stats.lines_read,
            parsed.messages.len(),
            parsed.stats.blank_lines,
            parsed.stats.malformed_lines,
        );

        Ok(parsed)
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

/// `<logs_root>/<group>/<YYYY-MM-DD>.txt`
pub fn log_path_for(logs_root: &Path, group: &str, date: NaiveDate) -> PathBuf {
    logs_root
        .join(group)
        .join(format!("{}.txt", date.format("%Y-%m-%d")))
}

/// Find all `.txt` files recursively under `dir`, sorted by path.
pub fn find_log_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Log directory does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "txt")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_log(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn parser() -> LogParser {
        LogParser::default()
    }

    // ── parse_line ────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_line_reconstructs_groups() {
        let msg = parser()
            .parse_line("2024-01-05 10:15:00 Ana: Quiero el 38 en 250")
            .unwrap();
        assert_eq!(msg.date, "2024-01-05");
        assert_eq!(msg.time, "10:15:00");
        assert_eq!(msg.user, "Ana");
        assert_eq!(msg.text, "Quiero el 38 en 250");
        assert_eq!(
            msg.derived_timestamp.unwrap().to_string(),
            "2024-01-05 10:15:00"
        );
        assert!(msg.attachment.is_none());
    }

    #[test]
    fn test_parse_line_user_stops_at_first_separator() {
        let msg = parser()
            .parse_line("2024-01-05 10:15:00 Ana María: precio: 250")
            .unwrap();
        assert_eq!(msg.user, "Ana María");
        assert_eq!(msg.text, "precio: 250");
    }

    #[test]
    fn test_parse_line_trims_surrounding_whitespace() {
        let msg = parser()
            .parse_line("  2024-01-05 10:16:00 Luis: hola \r")
            .unwrap();
        assert_eq!(msg.user, "Luis");
        assert_eq!(msg.text, "hola");
    }

    #[test]
    fn test_parse_line_empty_message_body() {
        // "Luis: " is trimmed to "Luis:" so the ": " separator is gone.
        assert!(parser().parse_line("2024-01-05 10:16:00 Luis: ").is_none());
    }

    #[test]
    fn test_parse_line_malformed() {
        let p = parser();
        assert!(p.parse_line("").is_none());
        assert!(p.parse_line("   ").is_none());
        assert!(p.parse_line("hola a todos").is_none());
        assert!(p.parse_line("2024-01-05 Ana: sin hora").is_none());
        assert!(p.parse_line("05/01/2024 10:15:00 Ana: formato distinto").is_none());
        assert!(p.parse_line("2024-01-05 10:15:00 Ana sin separador").is_none());
    }

    #[test]
    fn test_parse_line_impossible_date_keeps_message() {
        let msg = parser()
            .parse_line("2024-02-30 10:15:00 Ana: 38")
            .unwrap();
        assert_eq!(msg.date, "2024-02-30");
        assert!(msg.derived_timestamp.is_none());
    }

    #[test]
    fn test_parse_line_strips_bom() {
        let msg = parser()
            .parse_line("\u{feff}2024-01-05 10:15:00 Ana: hola")
            .unwrap();
        assert_eq!(msg.date, "2024-01-05");
    }

    #[test]
    fn test_parse_line_attachment_enabled() {
        let msg = parser()
            .parse_line("2024-10-17 12:58:15 Ana: [archivo guardado: 1729187892000.jpg]")
            .unwrap();
        let att = msg.attachment.unwrap();
        assert_eq!(att.millis, "1729187892000");
        assert!(att.timestamp.is_some());
    }

    #[test]
    fn test_parse_line_attachment_disabled() {
        let config = ClassifierConfig {
            extract_attachments: false,
            ..Default::default()
        };
        let msg = LogParser::new(config)
            .parse_line("2024-10-17 12:58:15 Ana: [archivo guardado: 1729187892000.jpg]")
            .unwrap();
        assert!(msg.attachment.is_none());
    }

    // ── parse_reader ──────────────────────────────────────────────────────────

    #[test]
    fn test_parse_reader_counts_skipped_lines() {
        let input = "2024-01-05 10:15:00 Ana: Quiero el 38 en 250\n\
                     \n\
                     basura\n\
                     2024-01-05 10:16:00 Luis: hola\n";
        let parsed = parser().parse_reader(input.as_bytes()).unwrap();
        assert_eq!(parsed.messages.len(), 2);
        assert_eq!(
            parsed.stats,
            ParseStats {
                lines_read: 4,
                blank_lines: 1,
                malformed_lines: 1,
            }
        );
    }

    #[test]
    fn test_parse_reader_invalid_utf8_is_malformed() {
        let mut input: Vec<u8> = b"2024-01-05 10:15:00 Ana: 38\n".to_vec();
        input.extend_from_slice(&[0xff, 0xfe, b'\n']);
        input.extend_from_slice(b"2024-01-05 10:16:00 Luis: 250\n");
        let parsed = parser().parse_reader(input.as_slice()).unwrap();
        assert_eq!(parsed.messages.len(), 2);
        assert_eq!(parsed.stats.malformed_lines, 1);
    }

    #[test]
    fn test_parse_reader_preserves_order() {
        let input = "2024-01-05 10:16:00 Luis: b\n2024-01-05 10:15:00 Ana: a\n";
        let parsed = parser().parse_reader(input.as_bytes()).unwrap();
        let users: Vec<&str> = parsed.messages.iter().map(|m| m.user.as_str()).collect();
        assert_eq!(users, vec!["Luis", "Ana"]);
    }

    #[test]
    fn test_parse_reader_no_trailing_newline() {
        let parsed = parser()
            .parse_reader("2024-01-05 10:15:00 Ana: 38".as_bytes())
            .unwrap();
        assert_eq!(parsed.messages.len(), 1);
        assert_eq!(parsed.stats.lines_read, 1);
    }

    // ── load_file ─────────────────────────────────────────────────────────────

    #[test]
    fn test_load_file_basic() {
        let dir = TempDir::new().unwrap();
        let path = write_log(
            dir.path(),
            "2024-01-05.txt",
            &["2024-01-05 10:15:00 Ana: Quiero el 38 en 250", "ruido"],
        );
        let parsed = parser().load_file(&path).unwrap();
        assert_eq!(parsed.messages.len(), 1);
        assert_eq!(parsed.stats.malformed_lines, 1);
    }

    #[test]
    fn test_load_file_missing() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("2024-01-05.txt");
        match parser().load_file(&missing) {
            Err(ShopError::LogFileNotFound(p)) => assert_eq!(p, missing),
            other => panic!("expected LogFileNotFound, got {:?}", other),
        }
    }

    // ── path helpers ──────────────────────────────────────────────────────────

    #[test]
    fn test_log_path_for() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let path = log_path_for(Path::new("logs"), "Ventas_55", date);
        assert_eq!(path, PathBuf::from("logs/Ventas_55/2024-01-05.txt"));
    }

    #[test]
    fn test_find_log_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        write_log(dir.path(), "2024-01-07.txt", &["x"]);
        write_log(dir.path(), "2024-01-05.txt", &["x"]);
        write_log(dir.path(), "notas.md", &["x"]);

        let files = find_log_files(dir.path());
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["2024-01-05.txt", "2024-01-07.txt"]);
    }

    #[test]
    fn test_find_log_files_nonexistent_dir() {
        let files = find_log_files(Path::new("/tmp/does-not-exist-shop-tools-xyz"));
        assert!(files.is_empty());
    }
}
