//! `sheetfan_io_json` v1:
//! Record source for the worksheet fan-out pipeline.
//!
//! - `spec`   : record model and source errors
//! - `reader` : gzip + JSON loading
pub mod reader;
pub mod spec;

pub use reader::{load_records, load_records_from_reader};
pub use spec::{EnumSourceFailure, Record, RecordId, SourceError};
