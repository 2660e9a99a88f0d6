//! Run configuration, read once from the process environment.

use std::num::IntErrorKind;
use std::path::PathBuf;

use sheetfan_io_xlsx::{
    EnumWorkbookMemoryMode, N_SHEETS_DEFAULT, N_SHEETS_MAX, N_SHEETS_MIN, SpecFanoutOptions,
    clamp_sheet_count,
};

/// Worksheet count variable.
pub const C_ENV_N_SHEETS: &str = "N_SHEETS";
/// Input path override.
pub const C_ENV_INPUT: &str = "SHEETFAN_INPUT";
/// Output path override.
pub const C_ENV_OUTPUT: &str = "SHEETFAN_OUTPUT";
/// Worksheet serialization mode (`standard`, `low`, `constant`).
pub const C_ENV_MEMORY_MODE: &str = "SHEETFAN_MEMORY_MODE";

/// Default gzip-compressed JSON input.
pub const C_PATH_INPUT_DEFAULT: &str = "../input.json.gzip";
/// Default workbook output.
pub const C_PATH_OUTPUT_DEFAULT: &str = "demo.xlsx";

/// Resolved run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRunConfig {
    /// Record source path.
    pub path_file_in: PathBuf,
    /// Fan-out options handed to the coordinator.
    pub fanout: SpecFanoutOptions,
    /// Adjustments made while resolving (never fatal).
    pub warnings: Vec<String>,
}

impl SpecRunConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut l_warnings = Vec::new();
        let n_sheets = parse_sheet_count(lookup(C_ENV_N_SHEETS).as_deref(), &mut l_warnings);
        let memory_mode =
            parse_memory_mode(lookup(C_ENV_MEMORY_MODE).as_deref(), &mut l_warnings);
        let path_file_in = derive_path(lookup(C_ENV_INPUT), C_PATH_INPUT_DEFAULT);
        let path_file_out = derive_path(lookup(C_ENV_OUTPUT), C_PATH_OUTPUT_DEFAULT);

        Self {
            path_file_in,
            fanout: SpecFanoutOptions {
                n_sheets,
                path_file_out,
                memory_mode,
            },
            warnings: l_warnings,
        }
    }
}

/// Parse the worksheet count.
///
/// Absent or non-integer values default to 1; out-of-range integers,
/// including ones beyond `i64`, are clamped into `1..=9`. Every adjustment
/// except absence is recorded.
pub fn parse_sheet_count(raw: Option<&str>, warnings: &mut Vec<String>) -> usize {
    let Some(c_raw) = raw else {
        return N_SHEETS_DEFAULT;
    };
    let n_requested = match c_raw.trim().parse::<i64>() {
        Ok(val) => val,
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => {
                warnings.push(format!(
                    "{C_ENV_N_SHEETS}={c_raw:?} is not an integer; using {N_SHEETS_DEFAULT}."
                ));
                return N_SHEETS_DEFAULT;
            }
        },
    };

    let n_sheets = clamp_sheet_count(n_requested);
    if n_sheets as i64 != n_requested {
        warnings.push(format!(
            "{C_ENV_N_SHEETS}={} outside {N_SHEETS_MIN}..={N_SHEETS_MAX}; clamped to {n_sheets}.",
            c_raw.trim()
        ));
    }
    n_sheets
}

/// Parse the worksheet serialization mode; unknown values fall back to the default.
pub fn parse_memory_mode(raw: Option<&str>, warnings: &mut Vec<String>) -> EnumWorkbookMemoryMode {
    let Some(c_raw) = raw else {
        return EnumWorkbookMemoryMode::default();
    };
    c_raw.parse().unwrap_or_else(|msg: String| {
        let mode_default = EnumWorkbookMemoryMode::default();
        warnings.push(format!("{C_ENV_MEMORY_MODE}: {msg} Using {mode_default}."));
        mode_default
    })
}

fn derive_path(raw: Option<String>, default: &str) -> PathBuf {
    match raw {
        Some(c_path) if !c_path.trim().is_empty() => PathBuf::from(c_path),
        _ => PathBuf::from(default),
    }
}
