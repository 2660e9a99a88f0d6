//! `sheetfan_io_xlsx` v1:
//! Concurrent worksheet fan-out writer.
//!
//! - `conf`     : constants, column layout and default format presets
//! - `spec`     : cell/format models, options and errors
//! - `util`     : cell formatting rules and sheet naming helpers
//! - `writer`   : per-worksheet record renderer
//! - `workbook` : workbook container and shared format registry
//! - `fanout`   : parallel sheet fan-out coordinator
//! - `report`   : run report models
pub mod conf;
pub mod fanout;
pub mod report;
pub mod spec;
pub mod util;
pub mod workbook;
pub mod writer;

pub use conf::{
    C_NUM_FORMAT_DATE, C_NUM_FORMAT_DECIMAL, C_NUM_FORMAT_TEXT, EnumFmtKey, N_NROWS_EXCEL_MAX,
    N_SHEETS_DEFAULT, N_SHEETS_MAX, N_SHEETS_MIN, derive_default_xlsx_formats,
};
pub use fanout::run_sheet_fanout;
pub use report::{SpecFanoutReport, SpecSheetReport, SpecWorkbookReport};
pub use spec::{
    EnumCellValue, EnumWorkbookMemoryMode, SpecCellFormat, SpecCellRendering, SpecFanoutOptions,
    SpecSheetFailure, XlsxFanoutError,
};
pub use util::{
    clamp_sheet_count, create_sheet_identifier, derive_record_row, parse_strict_date,
    validate_sheet_name,
};
pub use workbook::{FormatHandle, SheetHandle, SheetWriteTarget, SpecFormatRegistry, XlsxWorkbook};
pub use writer::render_sheet;
