//! Worksheet writer: renders the shared record slice into one worksheet.

use rust_xlsxwriter::{Format, Worksheet};
use sheetfan_io_json::Record;
use tracing::debug;

use crate::conf::{EnumFmtKey, N_COL_IDENTIFIER, N_WIDTH_COL_IDENTIFIER};
use crate::report::SpecSheetReport;
use crate::spec::{EnumCellValue, SpecCellFormat, XlsxFanoutError};
use crate::util::{cast_col_num, cast_row_num, derive_record_row, derive_xlsx_error};
use crate::workbook::SpecFormatRegistry;

/// Render every record as one row of `worksheet`, in input order.
///
/// Row `i` holds record `i`; there is no header row. Formats are resolved from
/// the shared registry once, before the first row. The first invalid date
/// aborts the render for this worksheet.
pub fn render_sheet(
    worksheet: &mut Worksheet,
    records: &[Record],
    format_registry: &SpecFormatRegistry,
) -> Result<SpecSheetReport, XlsxFanoutError> {
    let fmt_decimal = format_registry.resolve(EnumFmtKey::Decimal.as_str())?;
    let fmt_date = format_registry.resolve(EnumFmtKey::Date.as_str())?;
    let fmt_text = format_registry.resolve(EnumFmtKey::Text.as_str())?;
    let sheet_name = worksheet.name();

    worksheet
        .set_column_width(cast_col_num(N_COL_IDENTIFIER)?, N_WIDTH_COL_IDENTIFIER)
        .map_err(derive_xlsx_error)?;

    let mut n_cols = 0usize;
    for (n_idx_row, record) in records.iter().enumerate() {
        let n_row = cast_row_num(n_idx_row)?;
        let l_cells = derive_record_row(record, n_idx_row)?;
        n_cols = l_cells.len();

        for (n_idx_col, cell) in l_cells.iter().enumerate() {
            let fmt_cell = cell.fmt_key.map(|fmt_key| match fmt_key {
                EnumFmtKey::Decimal => fmt_decimal,
                EnumFmtKey::Date => fmt_date,
                EnumFmtKey::Text => fmt_text,
            });
            write_cell_with_format(
                worksheet,
                n_row,
                cast_col_num(n_idx_col)?,
                &cell.value,
                fmt_cell,
            )?;
        }
    }

    debug!(sheet = %sheet_name, n_rows = records.len(), "Rendered worksheet");
    Ok(SpecSheetReport {
        sheet_name,
        n_rows: records.len(),
        n_cols,
    })
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &EnumCellValue<'_>,
    format: Option<&Format>,
) -> Result<(), XlsxFanoutError> {
    let res_write = match (value, format) {
        (EnumCellValue::Text(val), None) => worksheet.write_string(row, col, *val),
        (EnumCellValue::Number(val), None) => worksheet.write_number(row, col, *val),
        (EnumCellValue::Number(val), Some(fmt)) => {
            worksheet.write_number_with_format(row, col, *val, fmt)
        }
        (EnumCellValue::Date(val), Some(fmt)) => {
            worksheet.write_datetime_with_format(row, col, val, fmt)
        }
        (EnumCellValue::Blank, Some(fmt)) => worksheet.write_blank(row, col, fmt),
        (EnumCellValue::Text(_) | EnumCellValue::Date(_) | EnumCellValue::Blank, _) => {
            return Err(XlsxFanoutError::Xlsx(format!(
                "cell ({row}, {col}) has no valid value/format pairing: {value:?}"
            )));
        }
    };
    res_write.map_err(derive_xlsx_error)?;
    Ok(())
}

/// Convert a registered format spec into a backend format.
pub fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    match &spec.num_format {
        Some(val) => Format::new().set_num_format(val),
        None => Format::new(),
    }
}
