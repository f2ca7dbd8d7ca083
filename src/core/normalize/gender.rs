//! Gender code normalization

use super::Normalizer;
use crate::domain::FieldValue;

/// Maps the source systems' gender spellings onto `Male` / `Female` / `Other`.
///
/// Matching is case-insensitive and ignores surrounding whitespace. The
/// mapping is total: any unrecognized or unset value becomes `Other`.
pub struct GenderNormalizer;

impl GenderNormalizer {
    fn canonical(value: &str) -> &'static str {
        match value.trim().to_lowercase().as_str() {
            "male" | "m" | "man" | "boy" => "Male",
            "female" | "f" | "woman" | "girl" => "Female",
            _ => "Other",
        }
    }
}

impl Normalizer for GenderNormalizer {
    fn normalize(&self, value: FieldValue) -> FieldValue {
        let canonical = match &value {
            FieldValue::Text(s) => Self::canonical(s),
            _ => "Other",
        };
        FieldValue::Text(canonical.to_string())
    }
}
