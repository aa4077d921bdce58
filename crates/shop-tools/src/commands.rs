//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use shop_core::error::ShopError;
use shop_core::settings::{OutputFormat, Settings};
use shop_core::time_utils::TimezoneHandler;
use shop_data::analysis::{analyze_group, analyze_log, LogReport};
use shop_data::reader::log_path_for;
use shop_export::sheets::build_workbook;
use shop_export::summary::render_summary;
use shop_export::writer::{write_json, write_totals_csv, write_workbook};
use shop_vision::classifier::{render_results, ShoeClassifier};
use shop_vision::features::PrecomputedFeatures;
use shop_vision::prototypes::{build_prototypes, PrototypeSet};
use tracing::{info, warn};

/// Write the artefacts selected by `format` for one report.
///
/// Nothing is written for an empty aggregation; the returned list is empty.
pub fn export_report(
    report: &LogReport,
    output_dir: &Path,
    format: OutputFormat,
    tz: &TimezoneHandler,
) -> shop_core::Result<Vec<PathBuf>> {
    let Some(tables) = report.aggregation.tables() else {
        return Ok(Vec::new());
    };
    let label = report.label();
    let mut written = Vec::new();

    if format.wants_csv() {
        let workbook = build_workbook(&label, tables, tz);
        written.extend(write_workbook(output_dir, &workbook)?);

        let totals = output_dir.join(format!("resumen_precios_{}.csv", label));
        write_totals_csv(&totals, tables)?;
        written.push(totals);
    }
    if format.wants_json() {
        let json = output_dir.join(format!("informe_{}.json", label));
        write_json(&json, report)?;
        written.push(json);
    }
    Ok(written)
}

fn print_report(report: &LogReport, written: &[PathBuf]) {
    print!("{}", render_summary(report));
    if report.aggregation.is_empty() {
        println!("Nothing written.");
    }
    for path in written {
        println!("Wrote {}", path.display());
    }
}

/// Summarise one daily log. A missing log is reported and leaves no output.
pub fn report(
    settings: &Settings,
    date: Option<NaiveDate>,
    file: Option<PathBuf>,
    format: OutputFormat,
) -> anyhow::Result<Option<LogReport>> {
    let tz = TimezoneHandler::new(&settings.timezone);
    let path = match file {
        Some(p) => p,
        None => log_path_for(
            &settings.logs_root,
            &settings.group,
            date.unwrap_or_else(|| tz.today()),
        ),
    };

    let report = match analyze_log(&path, settings.classifier_config()?) {
        Ok(r) => r,
        Err(ShopError::LogFileNotFound(missing)) => {
            warn!("Log file not found: {}", missing.display());
            eprintln!("No log file at {}", missing.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let written = export_report(&report, &settings.output_dir, format, &tz)?;
    print_report(&report, &written);
    Ok(Some(report))
}

/// Summarise every log of the configured group. Returns how many logs were
/// processed.
pub fn batch(settings: &Settings, format: OutputFormat) -> anyhow::Result<usize> {
    let tz = TimezoneHandler::new(&settings.timezone);
    let dir = settings.group_dir();

    let reports = match analyze_group(&dir, settings.classifier_config()?) {
        Ok(r) => r,
        Err(ShopError::NoLogFiles(d)) => {
            warn!("No log files in {}", d.display());
            eprintln!("No log files in {}", d.display());
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };

    for report in &reports {
        let written = export_report(report, &settings.output_dir, format, &tz)?;
        print_report(report, &written);
        println!();
    }
    info!("Processed {} logs from {}", reports.len(), dir.display());
    Ok(reports.len())
}

pub fn prototypes(dataset: &Path, features: &Path, out: &Path) -> anyhow::Result<PrototypeSet> {
    let extractor = PrecomputedFeatures::load(features)
        .with_context(|| format!("loading features from {}", features.display()))?;
    let set = build_prototypes(dataset, &extractor)?;
    if set.is_empty() {
        anyhow::bail!("no usable images under {}", dataset.display());
    }
    set.save(out)?;
    println!("Saved {} prototypes to {}", set.len(), out.display());
    Ok(set)
}

pub fn classify(
    folder: &Path,
    features: &Path,
    prototypes: &Path,
    alpha: f64,
    out: &Path,
) -> anyhow::Result<String> {
    let extractor = PrecomputedFeatures::load(features)
        .with_context(|| format!("loading features from {}", features.display()))?;
    let set = PrototypeSet::load(prototypes)
        .with_context(|| format!("loading prototypes from {}", prototypes.display()))?;
    let classifier = ShoeClassifier::new(set, alpha)?;

    let result = classifier.classify_folder(folder, &extractor)?;
    let text = render_results(&result);

    std::fs::write(out, &text)?;
    print!("{}", text);
    println!("Results saved to {}", out.display());
    Ok(text)
}
