//! NDJSON source loader
//!
//! Source extracts arrive as newline-delimited JSON, one resource per line.
//! This is a thin adapter: it deserializes each line into the nested-document
//! model and tags it with the expected resource type. Blank lines are
//! skipped; a line that fails to parse aborts the load with its line number,
//! since a truncated extract should never half-load.

use crate::domain::{RawResource, ResourceType, Result, StrataError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Load all resources from an NDJSON file.
///
/// # Errors
///
/// Returns [`StrataError::SourceLoad`] when the file cannot be opened or a
/// line is not valid JSON.
pub fn load_resources(path: &Path, resource_type: ResourceType) -> Result<Vec<RawResource>> {
    let file = File::open(path).map_err(|e| {
        StrataError::SourceLoad(format!("failed to open {}: {e}", path.display()))
    })?;
    let reader = BufReader::new(file);

    let mut resources = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            StrataError::SourceLoad(format!(
                "failed to read {} at line {}: {e}",
                path.display(),
                line_no + 1
            ))
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let content: serde_json::Value = serde_json::from_str(&line).map_err(|e| {
            StrataError::SourceLoad(format!(
                "invalid JSON in {} at line {}: {e}",
                path.display(),
                line_no + 1
            ))
        })?;
        resources.push(RawResource::new(resource_type, content));
    }

    Ok(resources)
}
