//! Gzip-compressed JSON record loading.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::debug;

use crate::spec::{EnumSourceFailure, Record, SourceError};

/// Load the full record set from a gzip-compressed JSON array file.
///
/// Records keep input order. Any open, decompression or parse failure is
/// reported as [`SourceError::SourceUnreadable`].
pub fn load_records<P>(path_file_in: P) -> Result<Vec<Record>, SourceError>
where
    P: AsRef<Path>,
{
    let path_file_in = path_file_in.as_ref();
    let file_in = File::open(path_file_in).map_err(|err| SourceError::SourceUnreadable {
        path: path_file_in.to_path_buf(),
        stage: EnumSourceFailure::Open,
        message: err.to_string(),
    })?;

    let l_records = load_records_from_reader(file_in, path_file_in)?;
    debug!(
        path = %path_file_in.display(),
        n_records = l_records.len(),
        "Loaded records"
    );
    Ok(l_records)
}

/// Decompress and parse records from any gzip byte stream.
///
/// `path_label` is only used in error reports.
pub fn load_records_from_reader<R>(reader: R, path_label: &Path) -> Result<Vec<Record>, SourceError>
where
    R: Read,
{
    let reader_json = BufReader::new(GzDecoder::new(reader));
    serde_json::from_reader::<_, Vec<Record>>(reader_json).map_err(|err| {
        let stage = if err.is_io() {
            EnumSourceFailure::Decompress
        } else {
            EnumSourceFailure::Parse
        };
        SourceError::SourceUnreadable {
            path: path_label.to_path_buf(),
            stage,
            message: err.to_string(),
        }
    })
}
