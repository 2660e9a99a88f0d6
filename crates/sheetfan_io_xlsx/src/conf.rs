//! XLSX constants, column layout and default format presets.

use std::collections::BTreeMap;

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];
/// Sheet name reserved by Excel.
pub const C_EXCEL_RESERVED_SHEET_NAME: &str = "History";

/// Lower bound of the worksheet fan-out.
pub const N_SHEETS_MIN: usize = 1;
/// Upper bound of the worksheet fan-out.
pub const N_SHEETS_MAX: usize = 9;
/// Worksheet count used when the configured value is missing or unparseable.
pub const N_SHEETS_DEFAULT: usize = 1;
/// Prefix of generated worksheet names (`Sheet1`, `Sheet2`, ...).
pub const C_SHEET_NAME_PREFIX: &str = "Sheet";

/// Number of columns written per record row.
pub const N_NCOLS_RECORD: usize = 7;
/// Width of the identifier column, in character units.
pub const N_WIDTH_COL_IDENTIFIER: f64 = 22.0;

/// Column positions of the record row layout.
pub const N_COL_IDENTIFIER: usize = 0;
pub const N_COL_STRING_1: usize = 1;
pub const N_COL_NUMERIC_STRING: usize = 2;
pub const N_COL_STRING_2: usize = 3;
pub const N_COL_AMOUNT: usize = 4;
pub const N_COL_DATE_2: usize = 5;
pub const N_COL_DATE_1: usize = 6;

/// Number format for the amount column.
pub const C_NUM_FORMAT_DECIMAL: &str = "0.000";
/// Number format for date columns.
pub const C_NUM_FORMAT_DATE: &str = "yyyy-mm-dd";
/// Text number format; carried by empty-string cells so they are stored.
pub const C_NUM_FORMAT_TEXT: &str = "@";

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumFmtKey {
    /// Three-decimal number format.
    Decimal,
    /// ISO-like date display format.
    Date,
    /// Text format of empty-string cells.
    Text,
}

impl EnumFmtKey {
    /// Registry name of the preset.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decimal => "decimal",
            Self::Date => "date",
            Self::Text => "text",
        }
    }
}

/// Build default named format presets used by the record writer.
pub fn derive_default_xlsx_formats() -> BTreeMap<String, SpecCellFormat> {
    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(
        EnumFmtKey::Decimal.as_str().to_string(),
        SpecCellFormat {
            num_format: Some(C_NUM_FORMAT_DECIMAL.to_string()),
        },
    );
    dict_fmt.insert(
        EnumFmtKey::Date.as_str().to_string(),
        SpecCellFormat {
            num_format: Some(C_NUM_FORMAT_DATE.to_string()),
        },
    );
    dict_fmt.insert(
        EnumFmtKey::Text.as_str().to_string(),
        SpecCellFormat {
            num_format: Some(C_NUM_FORMAT_TEXT.to_string()),
        },
    );
    dict_fmt
}
