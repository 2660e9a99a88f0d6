//! Record model and record-source error types.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

////////////////////////////////////////////////////////////////////////////////
// #region RecordModel

/// Opaque record identifier: JSON string or JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Numeric identifier (written as a number cell).
    Number(f64),
    /// Text identifier (written as a string cell).
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(val) => write!(f, "{val}"),
            Self::Text(val) => write!(f, "{val}"),
        }
    }
}

/// One input item.
///
/// Every field is explicit and optional: a missing key and a JSON `null` both
/// deserialize to `None`. Dates are kept as raw text; strict parsing happens
/// at cell-render time.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Record {
    /// Identifier (`id`).
    #[serde(default, rename = "id")]
    pub id: Option<RecordId>,
    /// First free-text field (`myString1`).
    #[serde(default, rename = "myString1")]
    pub my_string_1: Option<String>,
    /// First date, `YYYY-MM-DD` (`myDate1`).
    #[serde(default, rename = "myDate1")]
    pub my_date_1: Option<String>,
    /// Second date, `YYYY-MM-DD` (`myDate2`).
    #[serde(default, rename = "myDate2")]
    pub my_date_2: Option<String>,
    /// Decimal amount (`amount`).
    #[serde(default, rename = "amount")]
    pub amount: Option<f64>,
    /// Numeric-string field (`myNumericString`).
    #[serde(default, rename = "myNumericString")]
    pub my_numeric_string: Option<String>,
    /// Second free-text field (`myString2`).
    #[serde(default, rename = "myString2")]
    pub my_string_2: Option<String>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SourceErrors

/// Loading stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumSourceFailure {
    /// Input file could not be opened.
    Open,
    /// Gzip stream is corrupt or truncated.
    Decompress,
    /// Decompressed text is not a JSON array of records.
    Parse,
}

impl fmt::Display for EnumSourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c_stage = match self {
            Self::Open => "open",
            Self::Decompress => "decompress",
            Self::Parse => "parse",
        };
        write!(f, "{c_stage}")
    }
}

/// Record-source failure. Always fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Input missing, not valid gzip text, or not a valid JSON array.
    #[error("Source unreadable ({stage}): {}: {message}", .path.display())]
    SourceUnreadable {
        /// Input path.
        path: PathBuf,
        /// Failed loading stage.
        stage: EnumSourceFailure,
        /// Underlying error text.
        message: String,
    },
}

impl SourceError {
    /// Failed loading stage.
    pub fn stage(&self) -> EnumSourceFailure {
        match self {
            Self::SourceUnreadable { stage, .. } => *stage,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
