//! Validation warnings
//!
//! Warnings are observational: they are counted against the batch quality
//! gate and logged with their row index and field path, but they never stop
//! a record from being mapped and normalized.

use std::fmt;

/// Why a warning was emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningReason {
    /// A required field path did not resolve
    MissingRequiredField,
    /// A date-only field is not a valid `YYYY-MM-DD` string
    InvalidDateFormat,
    /// A date-time field is not a valid ISO-8601 string
    InvalidDateTimeFormat,
    /// A date-time field lies after the run's ingest timestamp
    FutureTimestamp,
    /// The declared `resourceType` does not match the expected discriminator
    WrongResourceType,
    /// A mapped source path did not resolve to a value
    MissingMappedValue,
    /// A mapped source path resolved to an object or array
    NonScalarValue,
    /// A conditional mapping's predicate did not hold
    ConditionNotMet,
}

impl fmt::Display for WarningReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WarningReason::MissingRequiredField => "missing required field",
            WarningReason::InvalidDateFormat => "value is not a valid YYYY-MM-DD date",
            WarningReason::InvalidDateTimeFormat => "value is not a valid ISO8601 date-time",
            WarningReason::FutureTimestamp => "timestamp is after the ingest time",
            WarningReason::WrongResourceType => "wrong resource type",
            WarningReason::MissingMappedValue => "missing value for mapped field",
            WarningReason::NonScalarValue => "mapped value is not a scalar",
            WarningReason::ConditionNotMet => "conditional mapping predicate not met",
        };
        write!(f, "{text}")
    }
}

/// One validation warning for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Zero-based row index within the source file
    pub row: usize,
    /// The field path the warning concerns
    pub path: String,
    /// The reason code
    pub reason: WarningReason,
}

impl ValidationWarning {
    pub fn new(row: usize, path: impl Into<String>, reason: WarningReason) -> Self {
        Self {
            row,
            path: path.into(),
            reason,
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' at row {}", self.reason, self.path, self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display_includes_row_and_path() {
        let warning =
            ValidationWarning::new(3, "provider", WarningReason::MissingRequiredField);
        assert_eq!(warning.to_string(), "missing required field 'provider' at row 3");
    }

    #[test]
    fn test_reason_display_variants() {
        assert_eq!(
            WarningReason::InvalidDateFormat.to_string(),
            "value is not a valid YYYY-MM-DD date"
        );
        assert_eq!(
            WarningReason::WrongResourceType.to_string(),
            "wrong resource type"
        );
    }
}
