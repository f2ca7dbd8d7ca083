//! Validate-config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config = %config_path, "Validating configuration");

        match load_config(config_path) {
            Ok(config) => {
                println!("Configuration is valid: {config_path}");
                println!(
                    "  database: {}:{}/{}",
                    config.database.host, config.database.port, config.database.dbname
                );
                println!(
                    "  warning threshold: {:.1}%  overlap threshold: {:.1}%",
                    config.ingest.warning_threshold_percent,
                    config.ingest.overlap_threshold_percent
                );
                Ok(0)
            }
            Err(e) => {
                eprintln!("Configuration is invalid: {e}");
                Ok(2)
            }
        }
    }
}
