//! CSV batch export
//!
//! Optional flat-file output alongside (or instead of) the database write.
//! The header row follows record key order with `origin` first, so exports
//! stay column-stable run over run.

use crate::domain::{ProcessedRecord, Result, StrataError};
use std::path::Path;

/// Write a batch of records to a CSV file.
///
/// The header is derived from the first record; all records in a batch share
/// the same key set by construction. An empty batch writes an empty file.
///
/// # Errors
///
/// Returns [`StrataError::Export`] on any write failure.
pub fn write_records(path: &Path, records: &[ProcessedRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| StrataError::Export(format!("failed to create {}: {e}", path.display())))?;

    if let Some(first) = records.first() {
        let mut header = vec!["origin"];
        header.extend(first.keys());
        writer
            .write_record(&header)
            .map_err(|e| StrataError::Export(e.to_string()))?;

        for record in records {
            let mut row = vec![record.origin().to_string()];
            row.extend(record.iter().map(|(_, v)| v.to_string()));
            writer
                .write_record(&row)
                .map_err(|e| StrataError::Export(e.to_string()))?;
        }
    }

    writer
        .flush()
        .map_err(|e| StrataError::Export(e.to_string()))?;
    Ok(())
}
