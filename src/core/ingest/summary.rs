//! Ingest run reporting

use crate::core::gate::GateDecision;
use crate::domain::ResourceType;
use std::time::Duration;
use uuid::Uuid;

/// Summary of one ingest run over one source file
#[derive(Debug, Clone)]
pub struct IngestSummary {
    /// Unique id for this run
    pub run_id: Uuid,

    /// Resource type that was ingested
    pub resource_type: ResourceType,

    /// Rows read and processed from the source file
    pub rows_processed: usize,

    /// Validation warnings accumulated across the batch
    pub warning_count: usize,

    /// Records written to the store (zero when the gate rejected or on
    /// dry-run)
    pub records_written: usize,

    /// The quality gate's decision
    pub gate: GateDecision,

    /// Whether writes were skipped because of dry-run mode
    pub dry_run: bool,

    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl IngestSummary {
    pub fn new(resource_type: ResourceType) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            resource_type,
            rows_processed: 0,
            warning_count: 0,
            records_written: 0,
            gate: GateDecision::Pass,
            dry_run: false,
            duration: Duration::from_secs(0),
        }
    }

    /// Warning rate over the batch, as a percentage. 0 for an empty batch.
    pub fn warning_rate(&self) -> f64 {
        if self.rows_processed == 0 {
            return 0.0;
        }
        self.warning_count as f64 / self.rows_processed as f64 * 100.0
    }

    /// Whether data landed (gate passed and writes were not suppressed).
    pub fn committed(&self) -> bool {
        self.gate.passed() && !self.dry_run
    }
}
