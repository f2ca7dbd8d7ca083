//! Raw resource documents
//!
//! A [`RawResource`] is one input document exactly as deserialized from the
//! source NDJSON: an arbitrarily nested JSON value tagged with the resource
//! type the caller expects it to be. Validation never mutates the content;
//! malformed documents are reported through warnings, not by rewriting.

use serde_json::Value;
use std::fmt;

/// Resource type discriminator
///
/// The expected type for a batch; each document's declared `resourceType`
/// field is checked against it during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// FHIR Claim resource
    Claim,
    /// FHIR Patient resource
    Patient,
}

impl ResourceType {
    /// The declared `resourceType` value this variant matches, lower-cased.
    pub fn discriminator(&self) -> &'static str {
        match self {
            ResourceType::Claim => "claim",
            ResourceType::Patient => "patient",
        }
    }

    /// Natural-key column for this resource type.
    pub fn natural_key(&self) -> &'static str {
        match self {
            ResourceType::Claim => "claim_id",
            ResourceType::Patient => "patient_id",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceType::Claim => write!(f, "Claim"),
            ResourceType::Patient => write!(f, "Patient"),
        }
    }
}

/// One input document, immutable as received
#[derive(Debug, Clone)]
pub struct RawResource {
    resource_type: ResourceType,
    content: Value,
}

impl RawResource {
    /// Wrap a deserialized document with its expected resource type.
    pub fn new(resource_type: ResourceType, content: Value) -> Self {
        Self {
            resource_type,
            content,
        }
    }

    /// The expected resource type for this document.
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// The nested document content.
    pub fn content(&self) -> &Value {
        &self.content
    }
}
