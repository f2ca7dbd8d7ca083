//! Ingest orchestration
//!
//! The coordinator ties the pipeline together for one source file: load the
//! NDJSON documents, run each through the processor, hand the complete batch
//! to the quality gate, and (only on a pass) commit every record through
//! the history store. The gate is a barrier: no write starts before the
//! whole batch has been processed and judged.
//!
//! Records are written sequentially in input order, which serializes writes
//! for duplicate natural keys within one file. A shutdown signal is honored
//! between records, never mid-transaction.

use crate::adapters::csv_export;
use crate::adapters::ndjson;
use crate::adapters::store::HistoryStore;
use crate::core::gate::{GateDecision, QualityGate};
use crate::core::ingest::batch::Batch;
use crate::core::ingest::summary::IngestSummary;
use crate::core::processor::ResourceProcessor;
use crate::domain::{RawResource, ResourceType, Result, StrataError};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Per-run ingest options
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Source-system provenance tag stamped on every record
    pub origin: i32,

    /// Evaluate the gate but skip all store writes
    pub dry_run: bool,

    /// Also write the processed batch to a CSV file. The export reflects the
    /// processed output and happens regardless of the gate decision.
    pub csv_out: Option<std::path::PathBuf>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            origin: crate::core::processor::DEFAULT_ORIGIN,
            dry_run: false,
            csv_out: None,
        }
    }
}

/// Drives load → process → gate → commit for one source file at a time
pub struct IngestCoordinator {
    store: Arc<dyn HistoryStore>,
    gate: QualityGate,
    options: IngestOptions,
}

impl IngestCoordinator {
    pub fn new(store: Arc<dyn HistoryStore>, gate: QualityGate, options: IngestOptions) -> Self {
        Self {
            store,
            gate,
            options,
        }
    }

    /// Ingest one NDJSON file of the given resource type.
    ///
    /// `ingest_ts` is the caller-supplied ingest timestamp for the run, used
    /// by the patient future-timestamp check. `shutdown` is polled between
    /// record writes; when it flips, the run stops with
    /// [`StrataError::Interrupted`].
    ///
    /// A gate rejection is not an error: the returned summary carries the
    /// decision and `records_written == 0`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be loaded, when a store
    /// transaction fails, or when the run is interrupted.
    pub async fn ingest_file(
        &self,
        resource_type: ResourceType,
        path: &Path,
        ingest_ts: DateTime<Utc>,
        shutdown: Option<watch::Receiver<bool>>,
    ) -> Result<IngestSummary> {
        let started = Instant::now();
        let mut summary = IngestSummary::new(resource_type);
        summary.dry_run = self.options.dry_run;

        let resources = ndjson::load_resources(path, resource_type)?;
        tracing::info!(
            resource_type = %resource_type,
            path = %path.display(),
            count = resources.len(),
            "Loaded source file"
        );

        let batch = self.process_batch(resource_type, &resources, ingest_ts)?;
        summary.rows_processed = batch.row_count();
        summary.warning_count = batch.warning_count();

        if let Some(csv_path) = &self.options.csv_out {
            csv_export::write_records(csv_path, batch.records())?;
            tracing::info!(path = %csv_path.display(), "Wrote processed batch to CSV");
        }

        summary.gate = match resource_type {
            ResourceType::Claim => self
                .gate
                .evaluate_claims(batch.warning_count(), batch.row_count()),
            ResourceType::Patient => {
                self.gate
                    .evaluate_patients(
                        batch.warning_count(),
                        batch.row_count(),
                        batch.natural_keys(),
                        self.store.as_ref(),
                    )
                    .await?
            }
        };

        if let GateDecision::Reject(violations) = &summary.gate {
            for violation in violations {
                tracing::warn!(
                    resource_type = %resource_type,
                    path = %path.display(),
                    %violation,
                    "Batch failed threshold checks"
                );
            }
            summary.duration = started.elapsed();
            return Ok(summary);
        }

        if self.options.dry_run {
            tracing::info!(
                count = batch.records().len(),
                "DRY RUN: gate passed, skipping store writes"
            );
            summary.duration = started.elapsed();
            return Ok(summary);
        }

        for (row, record) in batch.records().iter().enumerate() {
            if let Some(signal) = &shutdown {
                if *signal.borrow() {
                    return Err(StrataError::Interrupted(format!(
                        "shutdown requested after {} of {} records",
                        summary.records_written,
                        batch.records().len()
                    )));
                }
            }

            match resource_type {
                ResourceType::Claim => self.store.upsert_claim(record, row).await?,
                ResourceType::Patient => self.store.upsert_patient(record, row).await?,
            }
            summary.records_written += 1;
        }

        summary.duration = started.elapsed();
        tracing::info!(
            run_id = %summary.run_id,
            resource_type = %resource_type,
            rows = summary.rows_processed,
            warnings = summary.warning_count,
            written = summary.records_written,
            "Ingest run complete"
        );
        Ok(summary)
    }

    fn process_batch(
        &self,
        resource_type: ResourceType,
        resources: &[RawResource],
        ingest_ts: DateTime<Utc>,
    ) -> Result<Batch> {
        let processor = match resource_type {
            ResourceType::Claim => ResourceProcessor::claim(ingest_ts, self.options.origin)?,
            ResourceType::Patient => ResourceProcessor::patient(ingest_ts, self.options.origin)?,
        };

        let key_column = resource_type.natural_key();
        let mut batch = Batch::new();
        for (row, resource) in resources.iter().enumerate() {
            let outcome = processor.process(resource, row);
            let natural_key = outcome.record.text(key_column).map(str::to_string);
            batch.push(outcome, natural_key);
        }
        Ok(batch)
    }
}
