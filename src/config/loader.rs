//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::StrataConfig;
use super::secret::secret_string;
use crate::domain::errors::StrataError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into StrataConfig
/// 4. Applies environment variable overrides (`STRATA_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use strata::config::load_config;
///
/// let config = load_config("strata.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<StrataConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(StrataError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        StrataError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: StrataConfig = toml::from_str(&contents)
        .map_err(|e| StrataError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        StrataError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched, so documentation examples don't need
/// their variables set.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern compiles");
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(StrataError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the STRATA_* prefix
///
/// Environment variables follow the pattern STRATA_<SECTION>_<KEY>,
/// e.g. STRATA_DATABASE_HOST, STRATA_INGEST_WARNING_THRESHOLD_PERCENT.
fn apply_env_overrides(config: &mut StrataConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("STRATA_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("STRATA_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Database overrides
    if let Ok(val) = std::env::var("STRATA_DATABASE_HOST") {
        config.database.host = val;
    }
    if let Ok(val) = std::env::var("STRATA_DATABASE_PORT") {
        if let Ok(port) = val.parse() {
            config.database.port = port;
        }
    }
    if let Ok(val) = std::env::var("STRATA_DATABASE_USER") {
        config.database.user = val;
    }
    if let Ok(val) = std::env::var("STRATA_DATABASE_PASSWORD") {
        config.database.password = secret_string(val);
    }
    if let Ok(val) = std::env::var("STRATA_DATABASE_DBNAME") {
        config.database.dbname = val;
    }

    // Ingest overrides
    if let Ok(val) = std::env::var("STRATA_INGEST_WARNING_THRESHOLD_PERCENT") {
        if let Ok(threshold) = val.parse() {
            config.ingest.warning_threshold_percent = threshold;
        }
    }
    if let Ok(val) = std::env::var("STRATA_INGEST_OVERLAP_THRESHOLD_PERCENT") {
        if let Ok(threshold) = val.parse() {
            config.ingest.overlap_threshold_percent = threshold;
        }
    }
    if let Ok(val) = std::env::var("STRATA_INGEST_ORIGIN") {
        if let Ok(origin) = val.parse() {
            config.ingest.origin = origin;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("STRATA_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("STRATA_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
