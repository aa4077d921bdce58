use std::path::{Path, PathBuf};

use shop_core::error::Result;
use shop_core::models::GRAND_TOTAL_LABEL;
use shop_data::aggregator::SalesTables;
use shop_data::analysis::LogReport;
use tracing::debug;

use crate::sheets::{Sheet, Workbook};

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn write_sheet(path: &Path, sheet: &Sheet) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&sheet.headers)?;
    for row in &sheet.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    debug!("Wrote {} rows to {}", sheet.rows.len(), path.display());
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write each sheet of `workbook` to `<dir>/<workbook>.<sheet>.csv`.
///
/// All sheets are staged under `.tmp` names and only renamed into place once
/// every one was written, so a failure leaves no partial workbook behind.
/// Returns the written paths in sheet order.
pub fn write_workbook(dir: &Path, workbook: &Workbook) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(workbook.sheets.len());
    for sheet in &workbook.sheets {
        let path = dir.join(format!("{}.{}.csv", workbook.name, sheet.name));
        let tmp = staging_path(&path);
        if let Err(e) = write_sheet(&tmp, sheet) {
            let _ = std::fs::remove_file(&tmp);
            for (tmp, _) in &staged {
                let _ = std::fs::remove_file(tmp);
            }
            return Err(e);
        }
        staged.push((tmp, path));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (tmp, path) in staged {
        std::fs::rename(&tmp, &path)?;
        written.push(path);
    }
    Ok(written)
}

/// Flat `user,total` CSV: one row per user, then the grand-total row.
pub fn write_totals_csv(path: &Path, tables: &SalesTables) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["user", "total"])?;
    for total in &tables.user_totals {
        writer.write_record([total.user.as_str(), total.total.to_string().as_str()])?;
    }
    writer.write_record([GRAND_TOTAL_LABEL, tables.grand_total.to_string().as_str()])?;
    writer.flush()?;
    Ok(())
}

/// The whole report as pretty-printed JSON.
pub fn write_json(path: &Path, report: &LogReport) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
