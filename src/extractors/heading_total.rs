// src/extractors/heading_total.rs
use crate::extractors::record::{melt, LongRecord, RowKey};
use crate::utils::error::ExtractError;
use crate::workbook::layout::HeadingTotalLayout;
use crate::workbook::models::{Cell, RawSheet};

pub const TOTAL_REGION: &str = "Total";

/// Extractor for the fixed-position sheet where a heading column carries group
/// names (and their totals) and a detail column carries the regions.
pub struct HeadingTotalExtractor {
    layout: HeadingTotalLayout,
}

impl HeadingTotalExtractor {
    pub fn new(layout: HeadingTotalLayout) -> Self {
        Self { layout }
    }

    /// Melts the sheet into records flagged with `is_heading_total`, keeping
    /// only records that carry a numeric value.
    ///
    /// Columns are taken positionally and renamed to the layout's names, so the
    /// sheet must have exactly as many columns as the layout defines.
    pub fn extract(&self, sheet: &RawSheet) -> Result<Vec<LongRecord>, ExtractError> {
        let columns = self.layout.column_names();
        if sheet.width() != columns.len() {
            return Err(ExtractError::ColumnCount {
                sheet: self.layout.sheet_name.clone(),
                expected: columns.len(),
                found: sheet.width(),
            });
        }

        let mut subheading: Option<String> = None;
        let keys: Vec<RowKey> = sheet
            .rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                let heading = cells.first().map(Cell::as_label).unwrap_or_default();
                let detail = cells.get(1).map(Cell::as_label).unwrap_or_default();
                let is_heading_total = !heading.is_empty() && detail.is_empty();
                if !heading.is_empty() {
                    subheading = Some(heading);
                }
                RowKey {
                    row,
                    table_name: subheading.clone(),
                    region: if is_heading_total { TOTAL_REGION.to_string() } else { detail },
                    is_heading_total: Some(is_heading_total),
                }
            })
            .collect();

        // Period columns start right after heading and detail.
        let periods = self.layout.melted();
        let value_columns: Vec<usize> = (2..2 + periods.len()).collect();

        let melted = melt(sheet, &self.layout.sheet_name, &keys, &value_columns, periods);
        let total = melted.len();
        let records: Vec<LongRecord> = melted.into_iter().filter(|r| r.value.is_some()).collect();

        tracing::debug!(
            "Heading/total sheet '{}': {} rows, {} of {} melted values kept",
            self.layout.sheet_name,
            sheet.len(),
            records.len(),
            total
        );
        Ok(records)
    }
}
