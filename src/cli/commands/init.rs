//! Init command implementation
//!
//! Generates a starter configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "strata.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            eprintln!("Configuration file already exists: {}", self.output);
            eprintln!("Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::config_template()) {
            Ok(_) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set STRATA_DATABASE_PASSWORD in your environment or .env file");
                println!("  3. Validate configuration: strata validate-config");
                println!("  4. Ingest an extract: strata ingest --resource claim data/Claim.ndjson");
                Ok(0)
            }
            Err(e) => {
                eprintln!("Failed to write configuration file: {e}");
                Ok(5)
            }
        }
    }

    fn config_template() -> &'static str {
        r#"# Strata Configuration File
# FHIR structured-zone ETL tool

[application]
# Log level: trace, debug, info, warn, error
log_level = "info"
# Evaluate gates but skip database writes
dry_run = false

# Runtime environment: development, staging, production
environment = "development"

[database]
host = "localhost"
port = 5432
user = "strata"
# Substituted from the environment at load time
password = "${STRATA_DATABASE_PASSWORD}"
dbname = "structured_zone"
max_connections = 10
connection_timeout_seconds = 30

[ingest]
# Batch is rejected when its warning rate reaches this percentage
warning_threshold_percent = 5.0
# Patient batch is rejected when identifier overlap with history
# does not exceed this percentage (first load always passes)
overlap_threshold_percent = 20.0
# Source-system provenance tag stamped on every record
origin = 1

[logging]
# Enable rolling JSON file logs in addition to console output
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_template_parses_and_validates() {
        let substituted = InitArgs::config_template()
            .replace("${STRATA_DATABASE_PASSWORD}", "template-test");
        let config: crate::config::StrataConfig = toml::from_str(&substituted).unwrap();
        assert!(config.validate().is_ok());
    }
}
