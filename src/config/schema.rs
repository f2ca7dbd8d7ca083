//! Configuration schema types
//!
//! This module defines the configuration structure for Strata. Thresholds
//! are consumed here but owned by the caller's deployment: both gate
//! thresholds are percentages in 0–100.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main Strata configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrataConfig {
    /// Application-level settings
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// PostgreSQL connection settings
    pub database: DatabaseConfig,

    /// Ingest pipeline settings
    pub ingest: IngestConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StrataConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.database.validate()?;
        self.ingest.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (evaluate gates but don't write to the database)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// PostgreSQL connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database host
    pub host: String,

    /// Database port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database user
    pub user: String,

    /// Database password
    /// Stored securely in memory and automatically zeroized on drop
    pub password: SecretString,

    /// Database name
    pub dbname: String,

    /// Maximum pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Connection acquisition timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_seconds: u64,
}

impl DatabaseConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.host.is_empty() {
            return Err("database.host cannot be empty".to_string());
        }
        if self.port == 0 {
            return Err("database.port cannot be 0".to_string());
        }
        if self.user.is_empty() {
            return Err("database.user cannot be empty".to_string());
        }
        if self.password.expose_secret().is_empty() {
            return Err("database.password cannot be empty".to_string());
        }
        if self.dbname.is_empty() {
            return Err("database.dbname cannot be empty".to_string());
        }
        if self.max_connections == 0 || self.max_connections > 100 {
            return Err(format!(
                "database.max_connections must be between 1 and 100, got {}",
                self.max_connections
            ));
        }
        Ok(())
    }
}

/// Ingest pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Quality-gate warning-rate threshold, percent (0-100). A batch passes
    /// when its warning rate is strictly below this value.
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold_percent: f64,

    /// Quality-gate identifier-overlap threshold, percent (0-100). A patient
    /// batch passes when its overlap rate is strictly above this value
    /// (unless the history table is empty).
    #[serde(default = "default_overlap_threshold")]
    pub overlap_threshold_percent: f64,

    /// Source-system provenance tag stamped on every record
    #[serde(default = "default_origin")]
    pub origin: i32,
}

impl IngestConfig {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=100.0).contains(&self.warning_threshold_percent) {
            return Err(format!(
                "ingest.warning_threshold_percent must be between 0 and 100, got {}",
                self.warning_threshold_percent
            ));
        }
        if !(0.0..=100.0).contains(&self.overlap_threshold_percent) {
            return Err(format!(
                "ingest.overlap_threshold_percent must be between 0 and 100, got {}",
                self.overlap_threshold_percent
            ));
        }
        Ok(())
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            warning_threshold_percent: default_warning_threshold(),
            overlap_threshold_percent: default_overlap_threshold(),
            origin: default_origin(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily or hourly)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_max_connections() -> usize {
    10
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_warning_threshold() -> f64 {
    5.0
}

fn default_overlap_threshold() -> f64 {
    20.0
}

fn default_origin() -> i32 {
    1
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
