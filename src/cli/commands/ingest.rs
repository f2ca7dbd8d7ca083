//! Ingest command implementation
//!
//! Runs the full pipeline for one NDJSON extract: load, process, gate,
//! commit. A gate rejection exits with code 3 so schedulers can distinguish
//! "data refused" from operational failures.

use crate::adapters::postgres::{PostgresClient, PostgresHistoryStore};
use crate::config::load_config;
use crate::core::gate::QualityGate;
use crate::core::ingest::{IngestCoordinator, IngestOptions};
use crate::domain::ResourceType;
use chrono::Utc;
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Resource type selector for the CLI
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ResourceArg {
    Claim,
    Patient,
}

impl From<ResourceArg> for ResourceType {
    fn from(arg: ResourceArg) -> Self {
        match arg {
            ResourceArg::Claim => ResourceType::Claim,
            ResourceArg::Patient => ResourceType::Patient,
        }
    }
}

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Resource type contained in the file
    #[arg(long, value_enum)]
    pub resource: ResourceArg,

    /// Path to the NDJSON file to ingest
    pub file: PathBuf,

    /// Dry run mode - process and gate, but skip database writes
    #[arg(long)]
    pub dry_run: bool,

    /// Override the source-system origin tag
    #[arg(long)]
    pub origin: Option<i32>,

    /// Also write the processed batch to a CSV file
    #[arg(long, value_name = "PATH")]
    pub csv_out: Option<PathBuf>,
}

impl IngestArgs {
    /// Execute the ingest command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let resource_type: ResourceType = self.resource.into();
        tracing::info!(
            resource_type = %resource_type,
            file = %self.file.display(),
            "Starting ingest command"
        );

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let client = match PostgresClient::new(config.database.clone()) {
            Ok(c) => Arc::new(c),
            Err(e) => {
                eprintln!("Failed to create database client: {e}");
                return Ok(4);
            }
        };

        if let Err(e) = client.test_connection().await {
            eprintln!("Failed to connect to database: {e}");
            return Ok(4);
        }
        client.ensure_schema().await?;

        let store = Arc::new(PostgresHistoryStore::new(client));
        let gate = QualityGate::new(
            config.ingest.warning_threshold_percent,
            config.ingest.overlap_threshold_percent,
        );
        let options = IngestOptions {
            origin: self.origin.unwrap_or(config.ingest.origin),
            dry_run: self.dry_run || config.application.dry_run,
            csv_out: self.csv_out.clone(),
        };

        let coordinator = IngestCoordinator::new(store, gate, options);
        let ingest_ts = Utc::now();
        let summary = coordinator
            .ingest_file(resource_type, &self.file, ingest_ts, Some(shutdown_signal))
            .await?;

        println!(
            "Processed {} {} rows with {} warnings ({:.1}%)",
            summary.rows_processed,
            summary.resource_type,
            summary.warning_count,
            summary.warning_rate()
        );

        if !summary.gate.passed() {
            println!("Batch rejected: {}", summary.gate);
            return Ok(3);
        }

        if summary.dry_run {
            println!("Dry run: gate passed, no records written");
        } else {
            println!("Wrote {} records", summary.records_written);
        }
        Ok(0)
    }
}
