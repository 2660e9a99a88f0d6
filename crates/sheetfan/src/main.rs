//! `sheetfan`: load gzip-compressed JSON records and fan them out into
//! identical worksheets of one XLSX workbook.
mod config;
mod logging;

use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use sheetfan_io_json::load_records;
use sheetfan_io_xlsx::run_sheet_fanout;
use tracing::{error, info, warn};

use crate::config::SpecRunConfig;

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        eprintln!("{err:#}");
    }

    match run(SpecRunConfig::from_env()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let c_failure = format_failure(&err);
            error!("{c_failure}");
            eprintln!("{c_failure}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: SpecRunConfig) -> Result<()> {
    for c_warning in &config.warnings {
        warn!("{c_warning}");
    }

    let time_load = Instant::now();
    let l_records = load_records(&config.path_file_in).context("Load failed")?;
    info!(
        n_records = l_records.len(),
        elapsed = ?time_load.elapsed(),
        "Load finished"
    );

    let time_write = Instant::now();
    let report = run_sheet_fanout(&l_records, &config.fanout).context("Write failed")?;
    for c_warning in &report.warnings {
        warn!("{c_warning}");
    }
    info!(elapsed = ?time_write.elapsed(), "{report}");
    Ok(())
}

/// One-line failure message with the full context chain.
fn format_failure(err: &anyhow::Error) -> String {
    format!("sheetfan: {err:#}")
}
