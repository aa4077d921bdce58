//! Sheet construction for the sales workbook.
//!
//! The first sheet holds the expanded rows, a blank separator row, one
//! `TOTAL_USER` row per user total and a final `GRAND_TOTAL` row; the second
//! holds the size mention counts.

use shop_core::models::{ExpandedRow, GRAND_TOTAL_LABEL, GRAND_TOTAL_ROW_TYPE, TOTAL_ROW_TYPE};
use shop_core::time_utils::{TimezoneHandler, SHEET_DATETIME_FORMAT};
use shop_data::aggregator::SalesTables;

/// Sheet name for expanded rows plus totals.
pub const SALES_SHEET: &str = "Ventas_y_Totales";
/// Sheet name for size mention counts.
pub const SIZES_SHEET: &str = "Conteo_tallas";

pub const SALES_HEADERS: [&str; 8] = [
    "date",
    "time",
    "user",
    "type",
    "value",
    "message",
    "derived_timestamp",
    "attachment_timestamp",
];

pub const SIZES_HEADERS: [&str; 2] = ["size", "mentions"];

/// A named grid of text cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    fn new(name: &str, headers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push_blank(&mut self) {
        self.rows.push(vec![String::new(); self.headers.len()]);
    }
}

/// Sheets written together under one file-name stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workbook {
    pub name: String,
    pub sheets: Vec<Sheet>,
}

fn expanded_cells(row: &ExpandedRow, tz: &TimezoneHandler) -> Vec<String> {
    vec![
        row.date.clone(),
        row.time.clone(),
        row.user.clone(),
        row.kind.as_str().to_string(),
        row.value.map(|v| v.to_string()).unwrap_or_default(),
        row.message.clone(),
        row.derived_timestamp
            .map(|dt| dt.format(SHEET_DATETIME_FORMAT).to_string())
            .unwrap_or_default(),
        row.attachment_timestamp
            .map(|dt| tz.format_local(dt))
            .unwrap_or_default(),
    ]
}

fn total_cells(user: &str, row_type: &str, total: u128) -> Vec<String> {
    let mut cells = vec![String::new(); SALES_HEADERS.len()];
    cells[2] = user.to_string();
    cells[3] = row_type.to_string();
    cells[4] = total.to_string();
    cells
}

/// Expanded rows, a blank separator, the per-user totals, then the grand
/// total.
pub fn sales_sheet(tables: &SalesTables, tz: &TimezoneHandler) -> Sheet {
    let mut sheet = Sheet::new(SALES_SHEET, &SALES_HEADERS);

    for row in &tables.rows {
        sheet.rows.push(expanded_cells(row, tz));
    }

    sheet.push_blank();

    for total in &tables.user_totals {
        sheet
            .rows
            .push(total_cells(&total.user, TOTAL_ROW_TYPE, total.total));
    }
    sheet.rows.push(total_cells(
        GRAND_TOTAL_LABEL,
        GRAND_TOTAL_ROW_TYPE,
        tables.grand_total,
    ));

    sheet
}

pub fn sizes_sheet(tables: &SalesTables) -> Sheet {
    let mut sheet = Sheet::new(SIZES_SHEET, &SIZES_HEADERS);
    for count in &tables.size_counts {
        sheet
            .rows
            .push(vec![count.size.to_string(), count.mentions.to_string()]);
    }
    sheet
}

/// Both sheets for one log, named `informe_<label>`.
pub fn build_workbook(label: &str, tables: &SalesTables, tz: &TimezoneHandler) -> Workbook {
    Workbook {
        name: format!("informe_{}", label),
        sheets: vec![sales_sheet(tables, tz), sizes_sheet(tables)],
    }
}
