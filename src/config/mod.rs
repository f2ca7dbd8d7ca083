//! Configuration management
//!
//! Configuration is loaded from a TOML file with `${VAR}` environment
//! substitution and `STRATA_*` environment overrides, then validated before
//! anything else runs. Database credentials are wrapped in [`SecretString`].

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, DatabaseConfig, Environment, IngestConfig, LoggingConfig, StrataConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
