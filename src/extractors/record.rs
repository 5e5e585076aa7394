// src/extractors/record.rs
use serde::Serialize;

use crate::workbook::models::RawSheet;

/// One normalized `(sheet, table, region, period, value)` row.
///
/// Column order here is the column order of the destination table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRecord {
    pub sheet_name: String,
    pub table_name: Option<String>,
    pub region: String,
    pub period: String,
    pub value: Option<f64>,
    /// Only the heading/total extractor sets this.
    pub is_heading_total: Option<bool>,
}

/// Identifier values carried onto every melted record of one source row.
#[derive(Debug, Clone)]
pub struct RowKey {
    pub row: usize,
    pub table_name: Option<String>,
    pub region: String,
    pub is_heading_total: Option<bool>,
}

/// Reshapes wide value columns into long records.
///
/// Output is column-major: every key for the first value column, then every
/// key for the second, and so on. `periods[i]` names the period of
/// `value_columns[i]`.
pub fn melt(
    sheet: &RawSheet,
    sheet_name: &str,
    keys: &[RowKey],
    value_columns: &[usize],
    periods: &[String],
) -> Vec<LongRecord> {
    let mut records = Vec::with_capacity(keys.len() * value_columns.len());
    for (&col, period) in value_columns.iter().zip(periods) {
        for key in keys {
            let value = sheet
                .rows
                .get(key.row)
                .and_then(|row| row.get(col))
                .and_then(|cell| cell.as_number());
            records.push(LongRecord {
                sheet_name: sheet_name.to_string(),
                table_name: key.table_name.clone(),
                region: key.region.clone(),
                period: period.clone(),
                value,
                is_heading_total: key.is_heading_total,
            });
        }
    }
    records
}
