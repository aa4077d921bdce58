use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::classify::{ClassifierConfig, PriceRuleKind};
use crate::error::Result;
use crate::time_utils::TimezoneHandler;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Sales summaries from chat logs and shoe image matching
#[derive(Parser, Debug, Clone)]
#[command(
    name = "shop-tools",
    about = "Sales summaries from chat logs and shoe image matching",
    version
)]
pub struct Settings {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Root directory holding one sub-directory of daily logs per group
    #[arg(long, global = true, default_value = "logs")]
    pub logs_root: PathBuf,

    /// Chat group whose logs are processed
    #[arg(long, global = true, default_value = "Ventas_55")]
    pub group: String,

    /// Directory where summaries are written
    #[arg(long, global = true, default_value = "resumenes")]
    pub output_dir: PathBuf,

    /// Range a number must fall in to count as a price
    #[arg(long, global = true, value_enum, default_value_t = PriceRuleKind::Bounded)]
    pub price_rule: PriceRuleKind,

    /// Do not look for saved-file markers in messages
    #[arg(long, global = true)]
    pub no_attachments: bool,

    /// Timezone for attachment timestamps (auto-detected if not specified)
    #[arg(long, global = true, default_value = "auto", value_parser = parse_timezone)]
    pub timezone: String,

    /// Logging level
    #[arg(long, global = true, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long, global = true)]
    pub clear: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Summarise one daily log file (default)
    Report {
        /// Day to process (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Explicit log file, overrides --date/--group
        #[arg(long)]
        file: Option<PathBuf>,
        /// What to write
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
    /// Summarise every daily log file of the group
    Batch {
        /// What to write
        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
    /// Build per-class prototypes from a folder of labelled images
    Prototypes {
        /// Dataset directory with one sub-directory per class
        dataset: PathBuf,
        /// JSON file with precomputed image features
        #[arg(long)]
        features: PathBuf,
        /// Where to save the prototypes
        #[arg(long, default_value = "prototypes.json")]
        out: PathBuf,
    },
    /// Classify every image in a folder against saved prototypes
    Classify {
        /// Folder with the images to classify
        folder: PathBuf,
        /// JSON file with precomputed image features
        #[arg(long)]
        features: PathBuf,
        /// Prototypes produced by the `prototypes` command
        #[arg(long, default_value = "prototypes.json")]
        prototypes: PathBuf,
        /// Weight of shape similarity against colour similarity
        #[arg(long, default_value_t = 0.8)]
        alpha: f64,
        /// Text report destination
        #[arg(long, default_value = "resultados_clasificacion.txt")]
        out: PathBuf,
    },
}

/// Output artefacts written by the report commands.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One CSV per sheet plus the totals CSV
    Csv,
    /// A single JSON document
    Json,
    /// Both
    All,
}

impl OutputFormat {
    pub fn wants_csv(self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::All)
    }

    pub fn wants_json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::All)
    }
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.shop-tools/last_used.json`.
///
/// Only the locations are remembered. The price rule and timezone change how
/// a log is interpreted, so they always come from the current command line.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs_root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".shop-tools").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation: accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "logs_root") {
            if let Some(v) = last.logs_root {
                settings.logs_root = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "group") {
            if let Some(v) = last.group {
                settings.group = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "output_dir") {
            if let Some(v) = last.output_dir {
                settings.output_dir = v;
            }
        }

        settings = Self::resolve_auto_values(settings);

        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// The subcommand to run, `report` for today when none was given.
    pub fn effective_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Report {
            date: None,
            file: None,
            format: OutputFormat::Csv,
        })
    }

    /// Classifier configuration selected by `--price-rule` and
    /// `--no-attachments`.
    pub fn classifier_config(&self) -> Result<ClassifierConfig> {
        ClassifierConfig::new(self.price_rule.rule(), !self.no_attachments)
    }

    /// Directory holding the daily logs of the configured group.
    pub fn group_dir(&self) -> PathBuf {
        self.logs_root.join(&self.group)
    }

    /// Resolve the `"auto"` timezone and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::time_utils::get_system_timezone();
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            logs_root: Some(s.logs_root.clone()),
            group: Some(s.group.clone()),
            output_dir: Some(s.output_dir.clone()),
        }
    }
}

/// Accept `auto` or any IANA timezone name.
fn parse_timezone(value: &str) -> std::result::Result<String, String> {
    if value == "auto" || TimezoneHandler::validate_timezone(value) {
        Ok(value.to_string())
    } else {
        Err(format!("unknown timezone '{}'", value))
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
