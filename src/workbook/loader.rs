// src/workbook/loader.rs
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};

use crate::utils::error::SheetError;
use crate::workbook::layout::SheetParams;
use crate::workbook::models::{header_names, Cell, RawSheet};

/// An opened spreadsheet workbook.
pub struct Workbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl Workbook {
    /// Opens a workbook, failing early with `NotFound` when the path is missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SheetError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(SheetError::NotFound(path.display().to_string()));
        }

        let sheets = open_workbook_auto(&path).map_err(|source| SheetError::Open {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!("Opened workbook {}", path.display());

        Ok(Self { path, sheets })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    /// Reads one sheet, applying its column window and header offset.
    pub fn load_sheet(&mut self, name: &str, params: &SheetParams) -> Result<RawSheet, SheetError> {
        let range = self
            .sheets
            .worksheet_range(name)
            .map_err(|e| SheetError::Read {
                sheet: name.to_string(),
                message: e.to_string(),
            })?;

        let sheet = sheet_from_range(&range, params)?;
        tracing::debug!(
            "Loaded sheet '{}': {} columns x {} rows (window {:?}, header row {})",
            name,
            sheet.width(),
            sheet.len(),
            params.window,
            params.header_skip
        );
        Ok(sheet)
    }
}

/// Slices a worksheet range into a `RawSheet`.
///
/// Coordinates are absolute (row 0 is spreadsheet row 1) even though the
/// range itself starts at the first used cell. The row at `header_skip` names
/// the columns; every row below it down to the last used row is data. The
/// column window is clipped to the last used column.
pub fn sheet_from_range(range: &Range<Data>, params: &SheetParams) -> Result<RawSheet, SheetError> {
    let header_row = u32::try_from(params.header_skip)
        .map_err(|_| SheetError::HeaderRow(params.header_skip))?;
    let Some((end_row, end_col)) = range.end() else {
        return Ok(RawSheet::default());
    };

    let (first_col, last_col) = match params.window {
        Some(w) => (w.first, w.last.min(end_col)),
        None => (0, end_col),
    };
    if first_col > last_col || header_row > end_row {
        tracing::warn!(
            "Column window or header row lies outside the used range (ends at row {}, column {})",
            end_row,
            end_col
        );
        return Ok(RawSheet::default());
    }

    let read_row = |row: u32| -> Vec<Cell> {
        (first_col..=last_col)
            .map(|col| range.get_value((row, col)).map(to_cell).unwrap_or(Cell::Empty))
            .collect()
    };

    let columns = header_names(&read_row(header_row));
    let rows = (header_row + 1..=end_row).map(read_row).collect();
    Ok(RawSheet::new(columns, rows))
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}
