//! Sheet fan-out coordinator.

use std::time::Instant;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use sheetfan_io_json::Record;
use tracing::{debug, error, warn};

use crate::conf::{
    C_SHEET_NAME_PREFIX, N_NROWS_EXCEL_MAX, N_SHEETS_MAX, N_SHEETS_MIN,
    derive_default_xlsx_formats,
};
use crate::report::{SpecFanoutReport, SpecSheetReport};
use crate::spec::{SpecFanoutOptions, SpecSheetFailure, XlsxFanoutError};
use crate::util::create_sheet_identifier;
use crate::workbook::{SheetWriteTarget, SpecFormatRegistry, XlsxWorkbook};
use crate::writer::render_sheet;

type SheetTaskResult = (String, Result<SpecSheetReport, XlsxFanoutError>);

/// Write `records` into `n_sheets` identical worksheets of one workbook.
///
/// The run proceeds in three phases:
/// 1. Serial setup: clamp the sheet count to `1..=9`, register formats and
///    create `Sheet1..SheetN`.
/// 2. Fan-out: one rayon task per worksheet on a pool of exactly `N`
///    threads; every task reads the full shared record slice.
/// 3. Join, then close the container.
///
/// All tasks run to completion even when some fail. If any task failed the
/// container is dropped unclosed, no output file is written and
/// [`XlsxFanoutError::SheetTasksFailed`] lists every failure.
pub fn run_sheet_fanout(
    records: &[Record],
    options: &SpecFanoutOptions,
) -> Result<SpecFanoutReport, XlsxFanoutError> {
    let time_start = Instant::now();
    let mut report = SpecFanoutReport::default();

    let n_sheets = options.n_sheets.clamp(N_SHEETS_MIN, N_SHEETS_MAX);
    if n_sheets != options.n_sheets {
        report.warn(format!(
            "Sheet count {} clamped to {n_sheets} (allowed {N_SHEETS_MIN}..={N_SHEETS_MAX}).",
            options.n_sheets
        ));
    }
    if records.len() > N_NROWS_EXCEL_MAX {
        return Err(XlsxFanoutError::RowLimitExceeded {
            n_rows: records.len(),
            n_rows_max: N_NROWS_EXCEL_MAX,
        });
    }

    let mut workbook = XlsxWorkbook::create(&options.path_file_out, options.memory_mode);
    for (c_name, spec) in derive_default_xlsx_formats() {
        workbook.register_format(&c_name, spec)?;
    }
    for n_idx_sheet in 1..=n_sheets {
        workbook.add_worksheet(&create_sheet_identifier(C_SHEET_NAME_PREFIX, n_idx_sheet))?;
    }

    let l_results = {
        let (l_targets, registry) = workbook.split_for_write()?;
        dispatch_sheet_tasks(l_targets, records, registry, &mut report)
    };

    let mut l_failures = Vec::new();
    for (sheet_name, res_sheet) in l_results {
        match res_sheet {
            Ok(sheet_report) => report.sheets.push(sheet_report),
            Err(err) => {
                error!(sheet = %sheet_name, error = %err, "Sheet task failed");
                l_failures.push(SpecSheetFailure {
                    sheet_name,
                    error: err,
                });
            }
        }
    }
    if !l_failures.is_empty() {
        return Err(XlsxFanoutError::SheetTasksFailed {
            n_sheets_total: n_sheets,
            failures: l_failures,
        });
    }

    let report_workbook = workbook.close()?;
    report.path_file_out = report_workbook.path_file_out;
    report.elapsed = time_start.elapsed();
    Ok(report)
}

fn dispatch_sheet_tasks(
    l_targets: Vec<SheetWriteTarget<'_>>,
    records: &[Record],
    registry: &SpecFormatRegistry,
    report: &mut SpecFanoutReport,
) -> Vec<SheetTaskResult> {
    let n_workers = l_targets.len().max(1);
    let run_task = |mut target: SheetWriteTarget<'_>| -> SheetTaskResult {
        let sheet_name = target.sheet_name().to_string();
        debug!(sheet = %sheet_name, "Sheet task started");
        let res_sheet = render_sheet(target.worksheet(), records, registry);
        (sheet_name, res_sheet)
    };

    let thread_pool = ThreadPoolBuilder::new()
        .num_threads(n_workers)
        .thread_name(|n_idx| format!("sheetfan-sheet-{n_idx}"))
        .build();
    let Ok(thread_pool) = thread_pool else {
        let c_warning = format!(
            "Failed to initialize thread pool (workers={n_workers}); fallback to serial write."
        );
        warn!("{c_warning}");
        report.warn(c_warning);
        return l_targets.into_iter().map(run_task).collect();
    };

    thread_pool.install(|| {
        l_targets
            .into_par_iter()
            .with_max_len(1)
            .map(run_task)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use sheetfan_io_json::{Record, RecordId};

    use super::run_sheet_fanout;
    use crate::spec::{EnumWorkbookMemoryMode, SpecFanoutOptions, XlsxFanoutError};

    fn records_sample(n: usize) -> Vec<Record> {
        (0..n)
            .map(|n_idx| Record {
                id: Some(RecordId::Text(format!("id-{n_idx}"))),
                my_string_1: Some("x".to_string()),
                my_date_1: Some("2021-03-04".to_string()),
                my_date_2: Some("2021-05-06".to_string()),
                amount: Some(0.5),
                my_numeric_string: None,
                my_string_2: None,
            })
            .collect()
    }

    #[test]
    fn run_sheet_fanout_clamps_and_reports() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let options = SpecFanoutOptions {
            n_sheets: 12,
            path_file_out: tmp.path().join("out.xlsx"),
            memory_mode: EnumWorkbookMemoryMode::LowMemory,
        };

        let report = run_sheet_fanout(&records_sample(10), &options).expect("fanout");
        assert_eq!(report.sheet_count(), 9);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.sheets.iter().all(|sheet| sheet.n_rows == 10));
        assert_eq!(report.sheets[8].sheet_name, "Sheet9");
        assert!(options.path_file_out.is_file());
    }

    #[test]
    fn run_sheet_fanout_zero_sheets_becomes_one() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let options = SpecFanoutOptions {
            n_sheets: 0,
            path_file_out: tmp.path().join("out.xlsx"),
            memory_mode: EnumWorkbookMemoryMode::Standard,
        };
        let report = run_sheet_fanout(&records_sample(2), &options).expect("fanout");
        assert_eq!(report.sheet_count(), 1);
        assert_eq!(report.sheets[0].sheet_name, "Sheet1");
    }

    #[test]
    fn run_sheet_fanout_invalid_date_fails_every_sheet_without_output() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let options = SpecFanoutOptions {
            n_sheets: 3,
            path_file_out: tmp.path().join("out.xlsx"),
            memory_mode: EnumWorkbookMemoryMode::ConstantMemory,
        };
        let mut l_records = records_sample(4);
        l_records[1].my_date_1 = Some("2020-13-40".to_string());

        let err = run_sheet_fanout(&l_records, &options).expect_err("invalid date");
        let XlsxFanoutError::SheetTasksFailed {
            n_sheets_total,
            failures,
        } = err
        else {
            panic!("expected SheetTasksFailed");
        };
        assert_eq!(n_sheets_total, 3);
        assert_eq!(failures.len(), 3);
        assert_eq!(failures[0].sheet_name, "Sheet1");
        assert!(failures.iter().all(|failure| matches!(
            failure.error,
            XlsxFanoutError::InvalidDateFormat { row: 1, .. }
        )));
        assert!(!options.path_file_out.exists());
        assert_eq!(
            std::fs::read_dir(tmp.path()).expect("read dir").count(),
            0
        );
    }
}
