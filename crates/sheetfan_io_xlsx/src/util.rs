//! Stateless helpers: cell formatting rules, sheet naming and index casts.

use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::XlsxError;
use sheetfan_io_json::{Record, RecordId};

use crate::conf::{
    C_EXCEL_RESERVED_SHEET_NAME, EnumFmtKey, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_RECORD,
    N_SHEETS_MAX, N_SHEETS_MIN, TUP_EXCEL_ILLEGAL,
};
use crate::spec::{EnumCellValue, SpecCellRendering, XlsxFanoutError};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormattingRules

/// Parse a `YYYY-MM-DD` date strictly.
///
/// Rejects other separators, missing zero padding, trailing characters,
/// impossible calendar dates and years outside Excel's 1900..=9999 range.
pub fn parse_strict_date(value: &str) -> Result<NaiveDate, String> {
    let v_bytes = value.as_bytes();
    let if_shape_ok = v_bytes.len() == 10
        && v_bytes.iter().enumerate().all(|(n_idx, byte)| match n_idx {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        });
    if !if_shape_ok {
        return Err("expected YYYY-MM-DD".to_string());
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| format!("not a calendar date: {err}"))?;
    if !(1900..=9999).contains(&date.year()) {
        return Err(format!("year {} outside 1900..=9999", date.year()));
    }
    Ok(date)
}

/// Render a decimal amount; absent amounts become a blank formatted cell.
pub fn derive_amount_cell(amount: Option<f64>) -> SpecCellRendering<'static> {
    let value = match amount {
        Some(val) => EnumCellValue::Number(val),
        None => EnumCellValue::Blank,
    };
    SpecCellRendering::with_format(value, EnumFmtKey::Decimal)
}

/// Render a date field, failing on absent or malformed input.
pub fn derive_date_cell(
    value: Option<&str>,
    field: &'static str,
    row: usize,
) -> Result<SpecCellRendering<'static>, XlsxFanoutError> {
    let Some(c_value) = value else {
        return Err(XlsxFanoutError::InvalidDateFormat {
            field,
            row,
            value: None,
            reason: "missing value".to_string(),
        });
    };
    let date = parse_strict_date(c_value).map_err(|reason| XlsxFanoutError::InvalidDateFormat {
        field,
        row,
        value: Some(c_value.to_string()),
        reason,
    })?;
    Ok(SpecCellRendering::with_format(
        EnumCellValue::Date(date),
        EnumFmtKey::Date,
    ))
}

/// Render optional text.
///
/// Absent and empty text become a blank cell in the text format: XLSX drops an
/// unformatted empty string, so the format is what keeps the cell on disk.
pub fn derive_text_cell(value: Option<&str>) -> SpecCellRendering<'_> {
    match value {
        Some(val) if !val.is_empty() => SpecCellRendering::plain(EnumCellValue::Text(val)),
        _ => SpecCellRendering::with_format(EnumCellValue::Blank, EnumFmtKey::Text),
    }
}

/// Render the identifier in its native type.
pub fn derive_identifier_cell(id: Option<&RecordId>) -> SpecCellRendering<'_> {
    match id {
        Some(RecordId::Number(val)) => SpecCellRendering::plain(EnumCellValue::Number(*val)),
        Some(RecordId::Text(val)) => derive_text_cell(Some(val.as_str())),
        None => derive_text_cell(None),
    }
}

/// Render one record into the fixed 7-column row layout.
///
/// Column order: id, myString1, myNumericString, myString2, amount, myDate2,
/// myDate1. The second date precedes the first.
pub fn derive_record_row(
    record: &Record,
    row: usize,
) -> Result<[SpecCellRendering<'_>; N_NCOLS_RECORD], XlsxFanoutError> {
    Ok([
        derive_identifier_cell(record.id.as_ref()),
        derive_text_cell(record.my_string_1.as_deref()),
        derive_text_cell(record.my_numeric_string.as_deref()),
        derive_text_cell(record.my_string_2.as_deref()),
        derive_amount_cell(record.amount),
        derive_date_cell(record.my_date_2.as_deref(), "myDate2", row)?,
        derive_date_cell(record.my_date_1.as_deref(), "myDate1", row)?,
    ])
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Clamp a requested worksheet count into the supported range.
pub fn clamp_sheet_count(n_sheets: i64) -> usize {
    n_sheets.clamp(N_SHEETS_MIN as i64, N_SHEETS_MAX as i64) as usize
}

/// Create sequential sheet name (`Sheet1`, `Sheet2`, ...), respecting length cap.
pub fn create_sheet_identifier(prefix: &str, part_idx_1based: usize) -> String {
    let c_sheet_name_suffix = part_idx_1based.to_string();
    let n_len_prefix_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_sheet_name_suffix.len());

    let c_sheet_name_prefix: String = prefix.chars().take(n_len_prefix_max).collect();
    format!("{c_sheet_name_prefix}{c_sheet_name_suffix}")
}

/// Validate a worksheet name against Excel naming rules.
pub fn validate_sheet_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("sheet name must not be empty.".to_string());
    }
    if name.chars().count() > N_LEN_EXCEL_SHEET_NAME_MAX {
        return Err(format!(
            "sheet name exceeds {N_LEN_EXCEL_SHEET_NAME_MAX} characters."
        ));
    }
    if let Some(c_illegal) = TUP_EXCEL_ILLEGAL.iter().find(|c| name.contains(**c)) {
        return Err(format!("sheet name contains illegal character {c_illegal:?}."));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err("sheet name must not start or end with an apostrophe.".to_string());
    }
    if name.eq_ignore_ascii_case(C_EXCEL_RESERVED_SHEET_NAME) {
        return Err(format!(
            "{C_EXCEL_RESERVED_SHEET_NAME:?} is reserved by Excel."
        ));
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region IndexCasts

pub(crate) fn cast_row_num(value: usize) -> Result<u32, XlsxFanoutError> {
    u32::try_from(value).map_err(|_| XlsxFanoutError::Xlsx(format!("row index overflow: {value}")))
}

pub(crate) fn cast_col_num(value: usize) -> Result<u16, XlsxFanoutError> {
    u16::try_from(value)
        .map_err(|_| XlsxFanoutError::Xlsx(format!("column index overflow: {value}")))
}

pub(crate) fn derive_xlsx_error(err: XlsxError) -> XlsxFanoutError {
    XlsxFanoutError::Xlsx(format!("xlsx write error: {err}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
