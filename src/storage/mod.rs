// src/storage/mod.rs
pub mod postgres;

use std::fs;
use std::path::{Path, PathBuf};

use crate::extractors::LongRecord;
use crate::pipeline::SheetSummary;
use crate::utils::error::StorageError;

pub use postgres::PostgresSink;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Writes the long-format table to `<base_dir>/<table>.csv`, replacing any
    /// previous export.
    pub fn save_records(&self, table: &str, records: &[LongRecord]) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}.csv", table));

        let mut writer = csv::Writer::from_path(&file_path)?;
        for record in records {
            writer.serialize(record)?;
        }
        if records.is_empty() {
            // serialize() emits the header with the first row only
            writer.write_record(RECORD_COLUMNS)?;
        }
        writer.flush().map_err(StorageError::IoError)?;

        tracing::info!("Saved {} records to {}", records.len(), file_path.display());
        Ok(file_path)
    }

    /// Saves metadata about the run in JSON format
    pub fn save_run_metadata(
        &self,
        table: &str,
        workbook: &Path,
        sheets: &[SheetSummary],
        record_count: usize,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_meta.json", table));

        let metadata = serde_json::json!({
            "workbook": workbook.display().to_string(),
            "table": table,
            "record_count": record_count,
            "sheets": sheets,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }
}

/// Destination column order, shared by the CSV export and the database table.
pub const RECORD_COLUMNS: [&str; 6] = [
    "sheet_name",
    "table_name",
    "region",
    "period",
    "value",
    "is_heading_total",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::layout::ExtractorKind;

    fn record(table: Option<&str>, region: &str, value: f64, total: Option<bool>) -> LongRecord {
        LongRecord {
            sheet_name: "Table 11 - 1".into(),
            table_name: table.map(str::to_string),
            region: region.into(),
            period: "2021".into(),
            value: Some(value),
            is_heading_total: total,
        }
    }

    #[test]
    fn csv_has_fixed_header_and_blank_nulls() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(tmp.path()).unwrap();
        let records = vec![
            record(Some("World demand"), "OECD", 44.7, None),
            record(None, "Total", 100.0, Some(true)),
        ];
        let path = storage.save_records("opec_data", &records).unwrap();

        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], RECORD_COLUMNS.join(","));
        assert_eq!(lines[1], "Table 11 - 1,World demand,OECD,2021,44.7,");
        assert_eq!(lines[2], "Table 11 - 1,,Total,2021,100.0,true");
    }

    #[test]
    fn creates_missing_output_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("exports").join("momr");
        let storage = StorageManager::new(&nested).unwrap();
        let path = storage.save_records("opec_data", &[]).unwrap();
        assert!(nested.is_dir());
        assert_eq!(path, nested.join("opec_data.csv"));
    }

    #[test]
    fn empty_export_still_has_header() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(tmp.path()).unwrap();
        let path = storage.save_records("opec_data", &[]).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap().trim(), RECORD_COLUMNS.join(","));
    }

    #[test]
    fn metadata_lists_sheets() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(tmp.path()).unwrap();
        let sheets = vec![SheetSummary {
            sheet_name: "Table 11 - 3".into(),
            extractor: ExtractorKind::HeadingTotal,
            extracted: 20,
            kept: 18,
        }];
        let path = storage
            .save_run_metadata("opec_data", Path::new("momr.xlsx"), &sheets, 18)
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["record_count"], 18);
        assert_eq!(json["sheets"][0]["extractor"], "heading_total");
        assert_eq!(json["sheets"][0]["kept"], 18);
    }
}
