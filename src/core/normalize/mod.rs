//! Value normalizers
//!
//! Normalizers run after mapping: each one is keyed by a destination field
//! name and rewrites that field's value into its canonical form. Registering
//! a new normalizer requires no processor changes.

pub mod gender;

use crate::domain::FieldValue;
use std::collections::HashMap;

pub use gender::GenderNormalizer;

/// A value normalizer for one destination field
pub trait Normalizer: Send + Sync {
    /// Rewrite a mapped value into its canonical form.
    fn normalize(&self, value: FieldValue) -> FieldValue;
}

/// Normalizers keyed by destination field name
///
/// Fields without a registered normalizer pass through unchanged.
pub struct NormalizerRegistry {
    normalizers: HashMap<String, Box<dyn Normalizer>>,
}

impl NormalizerRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            normalizers: HashMap::new(),
        }
    }

    /// The built-in registry: gender normalization on the `gender` field.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("gender", GenderNormalizer);
        registry
    }

    /// Register a normalizer under a destination field name, replacing any
    /// previous normalizer for that field.
    pub fn register(&mut self, field: impl Into<String>, normalizer: impl Normalizer + 'static) {
        self.normalizers.insert(field.into(), Box::new(normalizer));
    }

    /// The normalizer for a field, if one is registered.
    pub fn get(&self, field: &str) -> Option<&dyn Normalizer> {
        self.normalizers.get(field).map(Box::as_ref)
    }
}

impl Default for NormalizerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Uppercase;

    impl Normalizer for Uppercase {
        fn normalize(&self, value: FieldValue) -> FieldValue {
            match value {
                FieldValue::Text(s) => FieldValue::Text(s.to_uppercase()),
                other => other,
            }
        }
    }

    #[test]
    fn test_builtin_registry_has_gender() {
        let registry = NormalizerRegistry::builtin();
        assert!(registry.get("gender").is_some());
        assert!(registry.get("status").is_none());
    }

    #[test]
    fn test_register_custom_normalizer() {
        let mut registry = NormalizerRegistry::empty();
        registry.register("diagnosis", Uppercase);

        let normalized = registry
            .get("diagnosis")
            .unwrap()
            .normalize(FieldValue::Text("s06".into()));
        assert_eq!(normalized, FieldValue::Text("S06".into()));
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = NormalizerRegistry::builtin();
        registry.register("gender", Uppercase);

        let normalized = registry
            .get("gender")
            .unwrap()
            .normalize(FieldValue::Text("m".into()));
        assert_eq!(normalized, FieldValue::Text("M".into()));
    }
}
