//! Declarative field specs per resource type
//!
//! A [`FieldSpec`] carries everything the processor needs to know about one
//! resource type: which paths must be present, which hold dates or
//! date-times, and the ordered mapping table projecting the nested document
//! into a flat record. Specs are built once at startup, with every path
//! expression parsed and validated before the first record is touched, and
//! stay immutable for the process lifetime.

use crate::core::path::FieldPath;
use crate::domain::{ResourceType, Result};
use serde_json::Value;

/// A sibling-path predicate attached to a conditional mapping entry
///
/// The predicate holds when the probe path resolves to a string equal to the
/// expected value, case-insensitively. When it does not hold, the mapped
/// destination becomes null regardless of what the source path resolves to.
#[derive(Debug, Clone)]
pub struct MapPredicate {
    probe: FieldPath,
    expected: String,
}

impl MapPredicate {
    pub fn new(probe: FieldPath, expected: impl Into<String>) -> Self {
        Self {
            probe,
            expected: expected.into(),
        }
    }

    /// Evaluate the predicate against a document.
    pub fn holds(&self, document: &Value) -> bool {
        match self.probe.resolve(document) {
            Some(Value::String(s)) => s.eq_ignore_ascii_case(&self.expected),
            _ => false,
        }
    }

    /// The probed sibling path.
    pub fn probe(&self) -> &FieldPath {
        &self.probe
    }
}

/// One entry of the mapping table: destination key, source path, optional
/// inclusion predicate.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    destination: String,
    source: FieldPath,
    predicate: Option<MapPredicate>,
}

impl FieldMapping {
    fn new(destination: &str, source: &str) -> Result<Self> {
        Ok(Self {
            destination: destination.to_string(),
            source: FieldPath::parse(source)?,
            predicate: None,
        })
    }

    fn with_predicate(destination: &str, source: &str, predicate: MapPredicate) -> Result<Self> {
        Ok(Self {
            destination: destination.to_string(),
            source: FieldPath::parse(source)?,
            predicate: Some(predicate),
        })
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn source(&self) -> &FieldPath {
        &self.source
    }

    pub fn predicate(&self) -> Option<&MapPredicate> {
        self.predicate.as_ref()
    }
}

/// Declarative configuration for one resource type
#[derive(Debug, Clone)]
pub struct FieldSpec {
    resource_type: ResourceType,
    required: Vec<FieldPath>,
    date_fields: Vec<FieldPath>,
    datetime_fields: Vec<FieldPath>,
    mappings: Vec<FieldMapping>,
    reject_future_datetimes: bool,
}

impl FieldSpec {
    /// The spec for FHIR Claim resources.
    pub fn claim() -> Result<Self> {
        let required = [
            "billablePeriod",
            "contained",
            "created",
            "id",
            "patient",
            "provider",
            "resourceType",
            "status",
            "total",
            "insurance",
        ];

        let admitting_predicate = MapPredicate::new(
            FieldPath::parse("diagnosis[0].diagnosisCodeableConcept.type[0].coding[0].code")?,
            "admitting",
        );

        Ok(Self {
            resource_type: ResourceType::Claim,
            required: parse_paths(&required)?,
            date_fields: parse_paths(&["billablePeriod.start", "billablePeriod.end"])?,
            datetime_fields: parse_paths(&["created"])?,
            mappings: vec![
                FieldMapping::new("claim_id", "id")?,
                FieldMapping::new("patient_id", "patient.reference")?,
                FieldMapping::new("billing_start", "billablePeriod.start")?,
                FieldMapping::new("billing_end", "billablePeriod.end")?,
                FieldMapping::new("provider", "provider.reference")?,
                FieldMapping::with_predicate(
                    "admitting_diagnosis",
                    "diagnosis[0].diagnosisCodeableConcept.coding[0].code",
                    admitting_predicate,
                )?,
                FieldMapping::new("insurance", "insurance[0].coverage.identifier.value")?,
                FieldMapping::new("status", "status")?,
                FieldMapping::new("created", "created")?,
                FieldMapping::new("amount", "total.value")?,
            ],
            reject_future_datetimes: false,
        })
    }

    /// The spec for FHIR Patient resources.
    ///
    /// Patient date-times additionally fail validation when they lie after
    /// the run's ingest timestamp.
    pub fn patient() -> Result<Self> {
        Ok(Self {
            resource_type: ResourceType::Patient,
            required: parse_paths(&["name", "id"])?,
            date_fields: parse_paths(&["birthDate"])?,
            datetime_fields: parse_paths(&["meta.lastUpdated"])?,
            mappings: vec![
                FieldMapping::new("first_name", "name[0].given[0]")?,
                FieldMapping::new("last_name", "name[0].family")?,
                FieldMapping::new("patient_id", "id")?,
            ],
            reject_future_datetimes: true,
        })
    }

    /// The spec for a given resource type.
    pub fn for_type(resource_type: ResourceType) -> Result<Self> {
        match resource_type {
            ResourceType::Claim => Self::claim(),
            ResourceType::Patient => Self::patient(),
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn required(&self) -> &[FieldPath] {
        &self.required
    }

    pub fn date_fields(&self) -> &[FieldPath] {
        &self.date_fields
    }

    pub fn datetime_fields(&self) -> &[FieldPath] {
        &self.datetime_fields
    }

    pub fn mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }

    pub fn reject_future_datetimes(&self) -> bool {
        self.reject_future_datetimes
    }
}

fn parse_paths(exprs: &[&str]) -> Result<Vec<FieldPath>> {
    exprs.iter().map(|e| FieldPath::parse(*e)).collect()
}
