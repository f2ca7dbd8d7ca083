//! Domain error types
//!
//! This module defines the error hierarchy for Strata. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Strata error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum StrataError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Field path expressions that fail to parse
    #[error("Invalid field path '{path}': {reason}")]
    InvalidFieldPath { path: String, reason: String },

    /// Errors while loading source NDJSON files
    #[error("Source load error: {0}")]
    SourceLoad(String),

    /// Persistence errors from the history store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Batch rejected by the quality gate
    #[error("Batch rejected by quality gate: {0}")]
    GateRejected(String),

    /// Ingest interrupted by a shutdown signal
    #[error("Ingest interrupted: {0}")]
    Interrupted(String),

    /// Export (CSV) errors
    #[error("Export error: {0}")]
    Export(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// History-store errors
///
/// Failures in the upsert-with-history protocol are fatal for the affected
/// record's transaction: the transaction rolls back and the error propagates
/// to the caller. These errors don't expose driver types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect or to obtain a pooled connection
    #[error("Failed to connect to PostgreSQL: {0}")]
    ConnectionFailed(String),

    /// Schema bootstrap failed
    #[error("Failed to initialize schema: {0}")]
    SchemaFailed(String),

    /// A record is missing its natural key and cannot be upserted
    #[error("Record at row {row} has no {key} value")]
    MissingNaturalKey { key: &'static str, row: usize },

    /// Transaction could not be started, executed, or committed
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A read query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for StrataError {
    fn from(err: std::io::Error) -> Self {
        StrataError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for StrataError {
    fn from(err: serde_json::Error) -> Self {
        StrataError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for StrataError {
    fn from(err: toml::de::Error) -> Self {
        StrataError::Configuration(format!("TOML parse error: {err}"))
    }
}
