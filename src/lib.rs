// Strata - FHIR Structured-Zone ETL Tool
// Copyright (c) 2025 Strata Contributors
// Licensed under the MIT License

//! # Strata - FHIR Structured-Zone ETL
//!
//! Strata is an ETL tool built in Rust that lands FHIR claim and patient
//! extracts (NDJSON, one resource per line) into structured-zone PostgreSQL
//! tables while preserving a full change history per natural key.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Resolving** values inside arbitrarily nested documents with
//!   dotted/bracketed field paths
//! - **Processing** each resource through a validate → map → normalize
//!   pipeline driven by declarative field specs
//! - **Gating** each batch on warning rate and identifier overlap before
//!   anything is written
//! - **Persisting** records with the upsert-with-history protocol, keeping
//!   current and history tables consistent
//!
//! ## Architecture
//!
//! Strata follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (path resolution, processing, gating, ingest)
//! - [`adapters`] - External integrations (NDJSON, CSV, PostgreSQL)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use strata::adapters::postgres::{PostgresClient, PostgresHistoryStore};
//! use strata::config::load_config;
//! use strata::core::gate::QualityGate;
//! use strata::core::ingest::{IngestCoordinator, IngestOptions};
//! use strata::domain::ResourceType;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("strata.toml")?;
//!
//!     let client = Arc::new(PostgresClient::new(config.database.clone())?);
//!     client.ensure_schema().await?;
//!
//!     let store = Arc::new(PostgresHistoryStore::new(client));
//!     let gate = QualityGate::new(
//!         config.ingest.warning_threshold_percent,
//!         config.ingest.overlap_threshold_percent,
//!     );
//!
//!     let coordinator = IngestCoordinator::new(store, gate, IngestOptions::default());
//!     let summary = coordinator
//!         .ingest_file(
//!             ResourceType::Claim,
//!             Path::new("data/Claim.ndjson"),
//!             chrono::Utc::now(),
//!             None,
//!         )
//!         .await?;
//!
//!     println!(
//!         "{} rows, {} warnings, {} written",
//!         summary.rows_processed, summary.warning_count, summary.records_written
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Strata uses the [`domain::StrataError`] type for all errors:
//!
//! ```rust,no_run
//! use strata::domain::StrataError;
//!
//! fn example() -> Result<(), StrataError> {
//!     let config = strata::config::load_config("strata.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Strata uses structured logging with the `tracing` crate. Every validation
//! warning is logged with its row index and field path:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!("Starting ingest");
//! warn!(row = 12, path = "billablePeriod.start", "validation warning");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
