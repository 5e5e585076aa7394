// src/workbook/layout.rs
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, SheetError};

// --- Defaults for the MOMR Appendix workbook ---
pub const DEFAULT_HEADER_SKIP: usize = 4;
pub const HEADING_TOTAL_SHEET: &str = "Table 11 - 3";

const DEFAULT_MARKERS: [&str; 6] = [
    "World demand",
    "Non-DoC liquids production",
    "OECD closing stock levels, mb",
    "Days of forward consumption in OECD, days",
    "Memo items",
    "Closing stock levels, mb",
];

const DEFAULT_PERIOD_COLUMNS: [&str; 11] = [
    "val_2021", "val_2022", "val_2023",
    "val_4Q22", "val_1Q23", "val_2Q23", "val_3Q23", "val_4Q23",
    "val_1Q24", "val_2Q24", "val_3Q24",
];

// The last defined period column (val_3Q24) has never been melted.
const DEFAULT_MELTED_PERIODS: usize = 10;

const DEFAULT_SHEET_WINDOWS: [(&str, &str); 5] = [
    ("Table 11 - 1", "B:O"),
    ("Table 11 - 2", "B:O"),
    ("Table 11 - 3", "B:O"),
    ("Table 11 - 4", "B:P"),
    ("Table 11 - 5", "B:L"),
];

/// Which extractor handles a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    Generic,
    HeadingTotal,
}

/// Zero-based, inclusive column range parsed from a spreadsheet spec like `B:O`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWindow {
    pub first: u32,
    pub last: u32,
}

impl ColumnWindow {
    pub fn parse(spec: &str) -> Result<Self, SheetError> {
        let invalid = || SheetError::ColumnWindow(spec.to_string());
        let (left, right) = match spec.split_once(':') {
            Some((l, r)) => (l, r),
            None => (spec, spec),
        };
        let first = column_index(left.trim()).ok_or_else(invalid)?;
        let last = column_index(right.trim()).ok_or_else(invalid)?;
        if last < first {
            return Err(invalid());
        }
        Ok(Self { first, last })
    }
}

/// `A` -> 0, `Z` -> 25, `AA` -> 26.
fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut acc: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = (ch.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        acc = acc.checked_mul(26)?.checked_add(digit)?;
    }
    Some(acc - 1)
}

/// Column window and header offset for one named sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SheetLayout {
    /// Spreadsheet column range such as `B:O`; `None` reads every used column.
    #[serde(default)]
    pub columns: Option<String>,
    /// Rows above the header row; `None` uses the workbook-wide default.
    #[serde(default)]
    pub header_skip: Option<usize>,
}

/// Resolved load parameters for one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetParams {
    pub window: Option<ColumnWindow>,
    pub header_skip: usize,
}

/// Fixed positional layout of the heading/total sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingTotalLayout {
    pub sheet_name: String,
    pub heading_column: String,
    pub detail_column: String,
    pub period_columns: Vec<String>,
    /// How many of `period_columns`, from the left, are reshaped into records.
    pub melted_periods: usize,
}

impl Default for HeadingTotalLayout {
    fn default() -> Self {
        Self {
            sheet_name: HEADING_TOTAL_SHEET.to_string(),
            heading_column: "col_b".to_string(),
            detail_column: "col_c".to_string(),
            period_columns: DEFAULT_PERIOD_COLUMNS.iter().map(|s| s.to_string()).collect(),
            melted_periods: DEFAULT_MELTED_PERIODS,
        }
    }
}

impl HeadingTotalLayout {
    /// Heading, detail, then every period column.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec![self.heading_column.clone(), self.detail_column.clone()];
        names.extend(self.period_columns.iter().cloned());
        names
    }

    pub fn melted(&self) -> &[String] {
        let n = self.melted_periods.min(self.period_columns.len());
        &self.period_columns[..n]
    }
}

/// Everything the pipeline needs to know about the workbook's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub markers: Vec<String>,
    pub skip_sheets: Vec<String>,
    pub default_header_skip: usize,
    pub sheets: BTreeMap<String, SheetLayout>,
    pub heading_total: HeadingTotalLayout,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let sheets = DEFAULT_SHEET_WINDOWS
            .iter()
            .map(|(name, cols)| {
                (
                    name.to_string(),
                    SheetLayout { columns: Some(cols.to_string()), header_skip: None },
                )
            })
            .collect();
        Self {
            markers: DEFAULT_MARKERS.iter().map(|s| s.to_string()).collect(),
            skip_sheets: vec!["Contents".to_string()],
            default_header_skip: DEFAULT_HEADER_SKIP,
            sheets,
            heading_total: HeadingTotalLayout::default(),
        }
    }
}

impl LayoutConfig {
    /// Reads a JSON layout file. Fields left out keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: LayoutConfig = serde_json::from_str(&text).map_err(|e| {
            AppError::Config(format!("Invalid layout file {}: {}", path.display(), e))
        })?;
        tracing::info!(
            "Loaded layout from {} ({} markers, {} sheet windows)",
            path.display(),
            config.markers.len(),
            config.sheets.len()
        );
        Ok(config)
    }

    pub fn is_skipped(&self, sheet_name: &str) -> bool {
        self.skip_sheets
            .iter()
            .any(|s| s.eq_ignore_ascii_case(sheet_name))
    }

    pub fn kind_for(&self, sheet_name: &str) -> ExtractorKind {
        if sheet_name == self.heading_total.sheet_name {
            ExtractorKind::HeadingTotal
        } else {
            ExtractorKind::Generic
        }
    }

    /// Load parameters for a sheet. Sheets without an entry read all columns
    /// with the default header skip.
    pub fn params_for(&self, sheet_name: &str) -> Result<SheetParams, SheetError> {
        let layout = self.sheets.get(sheet_name);
        let window = match layout.and_then(|l| l.columns.as_deref()) {
            Some(spec) => Some(ColumnWindow::parse(spec)?),
            None => None,
        };
        let header_skip = layout
            .and_then(|l| l.header_skip)
            .unwrap_or(self.default_header_skip);
        Ok(SheetParams { window, header_skip })
    }
}
