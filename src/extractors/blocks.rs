// src/extractors/blocks.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractors::record::{melt, LongRecord, RowKey};
use crate::workbook::models::RawSheet;

// --- Constants ---
pub const UNCLASSIFIED: &str = "Unclassified";

// A label opening with a parenthesized run, e.g. "(Total)" or "(a) Memo".
// Any such label closes the current block, total or not.
static TOTAL_ROW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\(.*\)").expect("Failed to compile TOTAL_ROW_RE")
});

// --- Data Structures ---
/// A contiguous row range `[start, end)` belonging to one sub-table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBlock {
    pub table_name: String,
    pub start: usize,
    pub end: usize,
}

impl TableBlock {
    pub fn rows(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Splits a sheet into marker-delimited sub-tables and melts each one.
pub struct BlockExtractor {
    markers: Vec<String>,
}

impl BlockExtractor {
    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }

    /// Extracts every recognized block, or one "Unclassified" block covering
    /// the whole sheet when no marker is present. Null values are kept.
    pub fn extract(&self, sheet: &RawSheet, sheet_name: &str) -> Vec<LongRecord> {
        let labels = sheet.labels();
        let found = locate_markers(&labels, &self.markers);

        let blocks = if found.is_empty() {
            tracing::info!("No table markers in '{}', treating sheet as {}", sheet_name, UNCLASSIFIED);
            vec![TableBlock {
                table_name: UNCLASSIFIED.to_string(),
                start: 0,
                end: sheet.len(),
            }]
        } else {
            partition_blocks(&labels, &found)
        };

        let value_columns: Vec<usize> = (1..sheet.width()).collect();
        let periods: Vec<String> = sheet.columns.iter().skip(1).cloned().collect();

        let mut records = Vec::new();
        for block in &blocks {
            tracing::debug!(
                "Block '{}' in '{}': rows {}..{}",
                block.table_name,
                sheet_name,
                block.start,
                block.end
            );
            let keys: Vec<RowKey> = block
                .rows()
                .map(|row| RowKey {
                    row,
                    table_name: Some(block.table_name.clone()),
                    region: labels[row].clone(),
                    is_heading_total: None,
                })
                .collect();
            records.extend(melt(sheet, sheet_name, &keys, &value_columns, &periods));
        }

        tracing::debug!("Extracted {} records from {} blocks in '{}'", records.len(), blocks.len(), sheet_name);
        records
    }
}

/// First row whose label contains each marker (case-insensitive), sorted by row.
///
/// Absent markers are skipped. An empty marker is contained in every label
/// and so matches row 0. The sort is stable, so markers matching the same row
/// stay in enumeration order.
pub fn locate_markers(labels: &[String], markers: &[String]) -> Vec<(String, usize)> {
    let lowered: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();

    let mut found: Vec<(String, usize)> = markers
        .iter()
        .filter_map(|marker| {
            let needle = marker.to_lowercase();
            lowered
                .iter()
                .position(|label| label.contains(&needle))
                .map(|row| (marker.clone(), row))
        })
        .collect();

    found.sort_by_key(|(_, row)| *row);
    found
}

/// First row after `start` whose trimmed label opens with a parenthesized run.
pub fn find_total_row(labels: &[String], start: usize) -> Option<usize> {
    labels
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, label)| TOTAL_ROW_RE.is_match(label.trim()))
        .map(|(idx, _)| idx)
}

/// Turns sorted marker positions into non-overlapping blocks.
///
/// A block ends just after its total row when that row comes before the next
/// marker; otherwise at the next marker, or at the end of the sheet.
pub fn partition_blocks(labels: &[String], found: &[(String, usize)]) -> Vec<TableBlock> {
    found
        .iter()
        .enumerate()
        .map(|(i, (table_name, start))| {
            let potential_end = found.get(i + 1).map(|(_, next)| *next).unwrap_or(labels.len());
            let end = match find_total_row(labels, *start) {
                Some(total) if total < potential_end => total + 1,
                _ => potential_end,
            };
            TableBlock {
                table_name: table_name.clone(),
                start: *start,
                end,
            }
        })
        .collect()
}
