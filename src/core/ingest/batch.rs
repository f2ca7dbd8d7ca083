//! Batch accumulation
//!
//! A [`Batch`] collects the outputs of processing one source file: the flat
//! records in input order, the cumulative warning count, and the natural-key
//! identifiers the quality gate's overlap check needs. The warning count
//! only ever grows as records are folded in.

use crate::core::processor::ProcessOutcome;
use crate::domain::ProcessedRecord;

/// The processed contents of one source file
#[derive(Debug, Default)]
pub struct Batch {
    records: Vec<ProcessedRecord>,
    row_count: usize,
    warning_count: usize,
    natural_keys: Vec<String>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record's outcome into the batch.
    ///
    /// `natural_key` is the record's identifier under the batch's key column,
    /// when it mapped to a value.
    pub fn push(&mut self, outcome: ProcessOutcome, natural_key: Option<String>) {
        self.row_count += 1;
        self.warning_count += outcome.warning_count();
        if let Some(key) = natural_key {
            self.natural_keys.push(key);
        }
        self.records.push(outcome.record);
    }

    pub fn records(&self) -> &[ProcessedRecord] {
        &self.records
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Natural-key identifiers in input order, one per record that had one.
    pub fn natural_keys(&self) -> &[String] {
        &self.natural_keys
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
