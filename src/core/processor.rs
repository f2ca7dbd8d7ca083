//! Per-record processing pipeline
//!
//! [`ResourceProcessor`] drives validate → map → normalize for one record at
//! a time, parameterized by an injected [`FieldSpec`] and a
//! [`NormalizerRegistry`]. Each call is independent: the outcome carries the
//! flat record and the warnings accumulated for that record, and the caller
//! folds warning counts across the batch. The processor itself holds only
//! shared read-only state, so records may be processed concurrently.
//!
//! Validation is observational throughout: a record with missing fields, bad
//! dates, or even the wrong resource type is still mapped and normalized;
//! partial data has salvage value downstream, and the quality gate decides
//! what happens to the batch as a whole.

use crate::core::normalize::NormalizerRegistry;
use crate::core::path::FieldPath;
use crate::core::spec::FieldSpec;
use crate::core::validate::{is_valid_date, DateTimeFormat};
use crate::domain::{
    FieldValue, ProcessedRecord, RawResource, Result, ValidationWarning, WarningReason,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Default origin tag for records with no configured source system.
pub const DEFAULT_ORIGIN: i32 = 1;

/// The result of processing one record
#[derive(Debug)]
pub struct ProcessOutcome {
    /// The flat record, always produced
    pub record: ProcessedRecord,
    /// Warnings accumulated while producing it
    pub warnings: Vec<ValidationWarning>,
}

impl ProcessOutcome {
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

/// Validate → map → normalize processor for one resource type
pub struct ResourceProcessor {
    spec: FieldSpec,
    registry: NormalizerRegistry,
    ingest_ts: DateTime<Utc>,
    origin: i32,
    datetime_format: DateTimeFormat,
}

impl ResourceProcessor {
    /// Build a processor from a spec and a normalizer registry.
    ///
    /// `ingest_ts` is the run's ingest timestamp, used by the
    /// future-timestamp check on resource types that enable it.
    pub fn new(
        spec: FieldSpec,
        registry: NormalizerRegistry,
        ingest_ts: DateTime<Utc>,
        origin: i32,
    ) -> Self {
        Self {
            spec,
            registry,
            ingest_ts,
            origin,
            datetime_format: DateTimeFormat::new(),
        }
    }

    /// A claim processor with the built-in normalizers.
    pub fn claim(ingest_ts: DateTime<Utc>, origin: i32) -> Result<Self> {
        Ok(Self::new(
            FieldSpec::claim()?,
            NormalizerRegistry::builtin(),
            ingest_ts,
            origin,
        ))
    }

    /// A patient processor with the built-in normalizers.
    pub fn patient(ingest_ts: DateTime<Utc>, origin: i32) -> Result<Self> {
        Ok(Self::new(
            FieldSpec::patient()?,
            NormalizerRegistry::builtin(),
            ingest_ts,
            origin,
        ))
    }

    pub fn spec(&self) -> &FieldSpec {
        &self.spec
    }

    /// Process one record: validate, map, normalize.
    ///
    /// `row` is the zero-based index of the record within its source file,
    /// carried into every warning.
    pub fn process(&self, resource: &RawResource, row: usize) -> ProcessOutcome {
        let mut warnings = Vec::new();

        self.validate(resource, row, &mut warnings);
        let mut record = self.map_values(resource, row, &mut warnings);
        self.normalize(&mut record);

        for warning in &warnings {
            tracing::warn!(
                row = warning.row,
                path = %warning.path,
                reason = %warning.reason,
                "validation warning"
            );
        }

        ProcessOutcome { record, warnings }
    }

    fn validate(&self, resource: &RawResource, row: usize, warnings: &mut Vec<ValidationWarning>) {
        let content = resource.content();

        for path in self.spec.required() {
            if path.resolve(content).is_none() {
                warnings.push(ValidationWarning::new(
                    row,
                    path.as_str(),
                    WarningReason::MissingRequiredField,
                ));
            }
        }

        // The declared type is checked only when present; a mismatch is a
        // warning, not a reason to drop the record.
        if let Some(Value::String(declared)) = crate::core::path::resolve(content, "resourceType") {
            if !declared.eq_ignore_ascii_case(resource.resource_type().discriminator()) {
                warnings.push(ValidationWarning::new(
                    row,
                    "resourceType",
                    WarningReason::WrongResourceType,
                ));
            }
        }

        for path in self.spec.date_fields() {
            self.check_date(content, path, row, warnings);
        }
        for path in self.spec.datetime_fields() {
            self.check_datetime(content, path, row, warnings);
        }
    }

    fn check_date(
        &self,
        content: &Value,
        path: &FieldPath,
        row: usize,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        match path.resolve(content) {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) if is_valid_date(s) => {}
            Some(_) => warnings.push(ValidationWarning::new(
                row,
                path.as_str(),
                WarningReason::InvalidDateFormat,
            )),
        }
    }

    fn check_datetime(
        &self,
        content: &Value,
        path: &FieldPath,
        row: usize,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        let value = match path.resolve(content) {
            None | Some(Value::Null) => return,
            Some(Value::String(s)) => s,
            Some(_) => {
                warnings.push(ValidationWarning::new(
                    row,
                    path.as_str(),
                    WarningReason::InvalidDateTimeFormat,
                ));
                return;
            }
        };

        if !self.datetime_format.matches(value) {
            warnings.push(ValidationWarning::new(
                row,
                path.as_str(),
                WarningReason::InvalidDateTimeFormat,
            ));
            return;
        }

        if self.spec.reject_future_datetimes() {
            if let Some(instant) = self.datetime_format.parse_utc(value) {
                if instant > self.ingest_ts {
                    warnings.push(ValidationWarning::new(
                        row,
                        path.as_str(),
                        WarningReason::FutureTimestamp,
                    ));
                }
            }
        }
    }

    fn map_values(
        &self,
        resource: &RawResource,
        row: usize,
        warnings: &mut Vec<ValidationWarning>,
    ) -> ProcessedRecord {
        let content = resource.content();
        let mut record = ProcessedRecord::new(self.origin);

        for mapping in self.spec.mappings() {
            let mut value = match mapping.source().resolve(content) {
                None | Some(Value::Null) => {
                    warnings.push(ValidationWarning::new(
                        row,
                        mapping.source().as_str(),
                        WarningReason::MissingMappedValue,
                    ));
                    FieldValue::Null
                }
                Some(resolved) => match FieldValue::from_json(resolved) {
                    Some(scalar) => scalar,
                    None => {
                        warnings.push(ValidationWarning::new(
                            row,
                            mapping.source().as_str(),
                            WarningReason::NonScalarValue,
                        ));
                        FieldValue::Null
                    }
                },
            };

            // The predicate overrides whatever the plain resolve produced.
            if let Some(predicate) = mapping.predicate() {
                if !predicate.holds(content) {
                    if !value.is_null() {
                        warnings.push(ValidationWarning::new(
                            row,
                            predicate.probe().as_str(),
                            WarningReason::ConditionNotMet,
                        ));
                    }
                    value = FieldValue::Null;
                }
            }

            record.push(mapping.destination(), value);
        }

        record
    }

    fn normalize(&self, record: &mut ProcessedRecord) {
        let keys: Vec<String> = record.keys().map(str::to_string).collect();
        for key in keys {
            if let Some(normalizer) = self.registry.get(&key) {
                let current = record.get(&key).cloned().unwrap_or(FieldValue::Null);
                record.set(&key, normalizer.normalize(current));
            }
        }
    }
}
