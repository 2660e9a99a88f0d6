//! Shared XLSX specification models, options and error types.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::conf::{EnumFmtKey, N_SHEETS_DEFAULT};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification registered on the workbook container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Number format code.
    pub num_format: Option<String>,
}

/// Normalized cell value produced by the formatting rules.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue<'a> {
    /// Blank cell carrying only its format.
    Blank,
    /// Text value.
    Text(&'a str),
    /// Numeric value.
    Number(f64),
    /// Calendar date, stored as an Excel date serial on write.
    Date(NaiveDate),
}

/// One rendered cell: stored value plus display format key.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecCellRendering<'a> {
    /// Stored value.
    pub value: EnumCellValue<'a>,
    /// Display format; `None` means the default cell format.
    pub fmt_key: Option<EnumFmtKey>,
}

impl<'a> SpecCellRendering<'a> {
    /// Cell written with the default format.
    pub fn plain(value: EnumCellValue<'a>) -> Self {
        Self {
            value,
            fmt_key: None,
        }
    }

    /// Cell written with a registered preset format.
    pub fn with_format(value: EnumCellValue<'a>, fmt_key: EnumFmtKey) -> Self {
        Self {
            value,
            fmt_key: Some(fmt_key),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Worksheet serialization mode of the workbook container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumWorkbookMemoryMode {
    /// Whole worksheet buffered in memory until close.
    Standard,
    /// Row data streamed to a temp file; strings kept in the shared table.
    #[default]
    LowMemory,
    /// Row data and strings streamed to a temp file.
    ConstantMemory,
}

impl EnumWorkbookMemoryMode {
    /// Config token of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::LowMemory => "low",
            Self::ConstantMemory => "constant",
        }
    }
}

impl fmt::Display for EnumWorkbookMemoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EnumWorkbookMemoryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "low" | "low_memory" => Ok(Self::LowMemory),
            "constant" | "constant_memory" => Ok(Self::ConstantMemory),
            other => Err(format!(
                "Unknown memory mode {other:?}; expected one of: standard, low, constant."
            )),
        }
    }
}

/// Options of one fan-out run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFanoutOptions {
    /// Requested worksheet count (clamped to the supported range).
    pub n_sheets: usize,
    /// Output workbook path.
    pub path_file_out: PathBuf,
    /// Worksheet serialization mode.
    pub memory_mode: EnumWorkbookMemoryMode,
}

impl Default for SpecFanoutOptions {
    fn default() -> Self {
        Self {
            n_sheets: N_SHEETS_DEFAULT,
            path_file_out: PathBuf::from("demo.xlsx"),
            memory_mode: EnumWorkbookMemoryMode::LowMemory,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// One failed worksheet task.
#[derive(Debug)]
pub struct SpecSheetFailure {
    /// Worksheet name.
    pub sheet_name: String,
    /// Task error.
    pub error: XlsxFanoutError,
}

/// Workbook/fan-out errors.
#[derive(Debug, thiserror::Error)]
pub enum XlsxFanoutError {
    /// A date field does not match `YYYY-MM-DD` or is not a real calendar date.
    #[error("Invalid date format in `{field}` at row {row}: {value:?} ({reason})")]
    InvalidDateFormat {
        /// Source field name.
        field: &'static str,
        /// Zero-based record position.
        row: usize,
        /// Raw value (`None` when absent).
        value: Option<String>,
        /// Parse failure text.
        reason: String,
    },
    /// A name is already registered with a different format spec.
    #[error("Format {name:?} is already registered with a different spec.")]
    FormatConflict {
        /// Format name.
        name: String,
    },
    /// A writer looked up a format name that was never registered.
    #[error("Format {name:?} is not registered.")]
    FormatNotRegistered {
        /// Format name.
        name: String,
    },
    /// Worksheet name violates Excel naming rules or is duplicated.
    #[error("Invalid sheet name {name:?}: {reason}")]
    InvalidSheetName {
        /// Rejected name.
        name: String,
        /// Rule that was violated.
        reason: String,
    },
    /// Record count does not fit into one worksheet.
    #[error("Row limit exceeded: {n_rows} rows, worksheet maximum is {n_rows_max}.")]
    RowLimitExceeded {
        /// Requested rows.
        n_rows: usize,
        /// Excel maximum.
        n_rows_max: usize,
    },
    /// Operation attempted on a closed container.
    #[error("Workbook container already closed: {}", .path.display())]
    ContainerClosed {
        /// Output path of the container.
        path: PathBuf,
    },
    /// Output file could not be assembled or written.
    #[error("Failed to write workbook {}: {message}", .path.display())]
    ContainerWriteFailure {
        /// Output path.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },
    /// One or more worksheet tasks failed; no output was written.
    #[error(
        "{} of {n_sheets_total} sheet tasks failed: {}",
        .failures.len(),
        derive_failure_summary(.failures)
    )]
    SheetTasksFailed {
        /// Number of tasks that ran.
        n_sheets_total: usize,
        /// Failed tasks in sheet order.
        failures: Vec<SpecSheetFailure>,
    },
    /// Cell/worksheet write error reported by the xlsx backend.
    #[error("{0}")]
    Xlsx(String),
}

fn derive_failure_summary(failures: &[SpecSheetFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("[{}] {}", failure.sheet_name, failure.error))
        .collect::<Vec<_>>()
        .join("; ")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
