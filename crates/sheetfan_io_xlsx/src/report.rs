//! Workbook and fan-out report models.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::spec::EnumWorkbookMemoryMode;

/// Result of rendering one worksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetReport {
    /// Worksheet name.
    pub sheet_name: String,
    /// Data rows written.
    pub n_rows: usize,
    /// Columns per row.
    pub n_cols: usize,
}

/// Result of closing the workbook container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecWorkbookReport {
    /// Final output path.
    pub path_file_out: PathBuf,
    /// Worksheet names in workbook order.
    pub sheet_names: Vec<String>,
    /// Serialization mode used.
    pub memory_mode: EnumWorkbookMemoryMode,
}

/// Aggregate report for one fan-out run.
#[derive(Debug, Clone, Default)]
pub struct SpecFanoutReport {
    /// Final output path.
    pub path_file_out: PathBuf,
    /// Per-worksheet results in workbook order.
    pub sheets: Vec<SpecSheetReport>,
    /// Non-fatal warnings (clamping, serial fallback).
    pub warnings: Vec<String>,
    /// Wall time from container creation to close.
    pub elapsed: Duration,
}

impl SpecFanoutReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Number of worksheets written.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Total data rows over all worksheets.
    pub fn row_count_total(&self) -> usize {
        self.sheets.iter().map(|sheet| sheet.n_rows).sum()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_sheets".to_string(), self.sheet_count() as u64);
        dict_counts.insert(
            "cnt_rows_per_sheet".to_string(),
            self.sheets.first().map_or(0, |sheet| sheet.n_rows) as u64,
        );
        dict_counts.insert("cnt_rows_total".to_string(), self.row_count_total() as u64);
        dict_counts.insert("cnt_warnings".to_string(), self.warnings.len() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} file={} sheets={} rows_per_sheet={} rows_total={} warnings={}",
            self.path_file_out.display(),
            dict_counts["cnt_sheets"],
            dict_counts["cnt_rows_per_sheet"],
            dict_counts["cnt_rows_total"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for SpecFanoutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[XLSX]"))
    }
}
