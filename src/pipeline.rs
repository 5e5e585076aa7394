// src/pipeline.rs
use serde::Serialize;

use crate::extractors::{BlockExtractor, HeadingTotalExtractor, LongRecord};
use crate::utils::AppError;
use crate::utils::error::SheetError;
use crate::workbook::layout::{ExtractorKind, LayoutConfig, SheetParams};
use crate::workbook::{RawSheet, Workbook};

/// Anything that can hand out sheets by name.
pub trait SheetSource {
    fn sheet_names(&self) -> Vec<String>;
    fn load_sheet(&mut self, name: &str, params: &SheetParams) -> Result<RawSheet, SheetError>;
}

impl SheetSource for Workbook {
    fn sheet_names(&self) -> Vec<String> {
        Workbook::sheet_names(self)
    }

    fn load_sheet(&mut self, name: &str, params: &SheetParams) -> Result<RawSheet, SheetError> {
        Workbook::load_sheet(self, name, params)
    }
}

/// Per-sheet counts, written alongside the export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetSummary {
    pub sheet_name: String,
    pub extractor: ExtractorKind,
    pub extracted: usize,
    pub kept: usize,
}

#[derive(Debug, Default)]
pub struct PipelineOutput {
    pub records: Vec<LongRecord>,
    pub sheets: Vec<SheetSummary>,
}

/// Runs every non-skipped sheet through its extractor and combines the results.
///
/// Records without a numeric value are dropped after combining. The first
/// extraction or load failure aborts the run.
pub fn run<S: SheetSource>(config: &LayoutConfig, source: &mut S) -> Result<PipelineOutput, AppError> {
    let blocks = BlockExtractor::new(config.markers.clone());
    let heading_total = HeadingTotalExtractor::new(config.heading_total.clone());

    let mut output = PipelineOutput::default();
    for sheet_name in source.sheet_names() {
        if config.is_skipped(&sheet_name) {
            tracing::info!("Skipping sheet '{}'", sheet_name);
            continue;
        }

        let params = config.params_for(&sheet_name)?;
        let sheet = source.load_sheet(&sheet_name, &params)?;
        if sheet.is_empty() {
            tracing::warn!("Sheet '{}' has no rows below its header", sheet_name);
        }
        let kind = config.kind_for(&sheet_name);

        let extracted = match kind {
            ExtractorKind::HeadingTotal => heading_total.extract(&sheet)?,
            ExtractorKind::Generic => blocks.extract(&sheet, &sheet_name),
        };
        let extracted_count = extracted.len();
        let before = output.records.len();
        output.records.extend(extracted.into_iter().filter(|r| r.value.is_some()));
        let kept = output.records.len() - before;

        tracing::info!(
            "Parsed sheet '{}' with {:?} extractor: {} records ({} without a value dropped)",
            sheet_name,
            kind,
            kept,
            extracted_count - kept
        );
        output.sheets.push(SheetSummary {
            sheet_name,
            extractor: kind,
            extracted: extracted_count,
            kept,
        });
    }

    tracing::info!(
        "Combined {} records from {} sheets",
        output.records.len(),
        output.sheets.len()
    );
    Ok(output)
}

/// Logs the first `limit` records, one line each.
pub fn log_preview(records: &[LongRecord], limit: usize) {
    for (idx, r) in records.iter().take(limit).enumerate() {
        tracing::info!(
            "{:>4} | {} | {} | {} | {} | {:?}{}",
            idx,
            r.sheet_name,
            r.table_name.as_deref().unwrap_or(""),
            r.region,
            r.period,
            r.value,
            r.is_heading_total
                .map(|t| format!(" | heading_total={}", t))
                .unwrap_or_default()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::models::Cell;
    use std::collections::HashMap;

    /// In-memory workbook; records which sheets were requested and with what.
    struct MemorySource {
        order: Vec<String>,
        sheets: HashMap<String, RawSheet>,
        requested: Vec<(String, SheetParams)>,
    }

    impl MemorySource {
        fn new(sheets: Vec<(&str, RawSheet)>) -> Self {
            Self {
                order: sheets.iter().map(|(n, _)| n.to_string()).collect(),
                sheets: sheets.into_iter().map(|(n, s)| (n.to_string(), s)).collect(),
                requested: Vec::new(),
            }
        }
    }

    impl SheetSource for MemorySource {
        fn sheet_names(&self) -> Vec<String> {
            self.order.clone()
        }

        fn load_sheet(&mut self, name: &str, params: &SheetParams) -> Result<RawSheet, SheetError> {
            self.requested.push((name.to_string(), params.clone()));
            self.sheets.get(name).cloned().ok_or_else(|| SheetError::Read {
                sheet: name.to_string(),
                message: "missing".to_string(),
            })
        }
    }

    fn generic_sheet() -> RawSheet {
        RawSheet::new(
            vec!["Unnamed: 0".into(), "2021".into(), "2022".into()],
            vec![
                vec![Cell::from("World demand"), Cell::Empty, Cell::Empty],
                vec![Cell::from("OECD"), Cell::Number(44.7), Cell::Number(45.6)],
                vec![Cell::from("(Total)"), Cell::Number(97.0), Cell::from("-")],
            ],
        )
    }

    fn heading_total_sheet() -> RawSheet {
        let mut total = vec![Cell::from("Total supply"), Cell::Empty];
        total.extend((0..11).map(|i| Cell::Number(100.0 + i as f64)));
        let mut opec = vec![Cell::Empty, Cell::from("OPEC")];
        opec.extend((0..11).map(|i| Cell::Number(40.0 + i as f64)));
        let columns = (0..13).map(|i| format!("c{}", i)).collect();
        RawSheet::new(columns, vec![total, opec])
    }

    #[test]
    fn skips_contents_and_dispatches_by_sheet() {
        let mut source = MemorySource::new(vec![
            ("Contents", RawSheet::default()),
            ("Table 11 - 1", generic_sheet()),
            ("Table 11 - 3", heading_total_sheet()),
        ]);
        let output = run(&LayoutConfig::default(), &mut source).unwrap();

        let requested: Vec<&str> = source.requested.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(requested, vec!["Table 11 - 1", "Table 11 - 3"]);
        assert_eq!(source.requested[0].1.header_skip, 4);

        assert_eq!(output.sheets.len(), 2);
        assert_eq!(output.sheets[0].extractor, ExtractorKind::Generic);
        assert_eq!(output.sheets[1].extractor, ExtractorKind::HeadingTotal);

        // Generic: 3 rows x 2 periods = 6, minus 2 blank marker cells and one "-".
        assert_eq!(output.sheets[0].extracted, 6);
        assert_eq!(output.sheets[0].kept, 3);
        // Heading/total: 2 rows x 10 melted periods.
        assert_eq!(output.sheets[1].kept, 20);

        assert_eq!(output.records.len(), 23);
        assert!(output.records.iter().all(|r| r.value.is_some()));
        assert!(output.records[..3].iter().all(|r| r.is_heading_total.is_none()));
        assert!(output.records[3..].iter().all(|r| r.is_heading_total.is_some()));
    }

    #[test]
    fn extractor_failure_aborts_the_run() {
        let narrow = RawSheet::new(vec!["a".into(), "b".into()], vec![]);
        let mut source = MemorySource::new(vec![("Table 11 - 3", narrow)]);
        let err = run(&LayoutConfig::default(), &mut source).unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[test]
    fn unknown_sheets_read_all_columns() {
        let mut source = MemorySource::new(vec![("Table 12 - 9", generic_sheet())]);
        run(&LayoutConfig::default(), &mut source).unwrap();
        assert_eq!(source.requested[0].1.window, None);
    }
}
