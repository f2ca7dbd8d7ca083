//! Status command implementation
//!
//! Shows row counts for the structured-zone tables, as a quick operational
//! view of what has landed so far.

use crate::adapters::postgres::{PostgresClient, PostgresHistoryStore};
use crate::adapters::store::HistoryStore;
use crate::config::load_config;
use clap::Args;
use std::sync::Arc;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking structured-zone status");

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

        let store = PostgresHistoryStore::new(client);
        let counts = match store.table_counts().await {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to query table counts: {e}");
                return Ok(5);
            }
        };

        println!("Structured-zone tables:");
        println!("  claims:           {:>10}", counts.claims);
        println!("  claims_history:   {:>10}", counts.claims_history);
        println!("  patients:         {:>10}", counts.patients);
        println!("  patients_history: {:>10}", counts.patients_history);
        Ok(0)
    }
}
