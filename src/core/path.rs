//! Path-based field access over nested documents
//!
//! A field path addresses a location inside a nested JSON document using `.`
//! for object members and `[n]` for sequence indexes, with mixed nesting
//! allowed (`diagnosis[0].diagnosisCodeableConcept.coding[0].code`).
//!
//! Resolution never mutates the document and never fails: absent data is
//! `None`, which stays distinguishable from a present JSON `null`
//! (`Some(Value::Null)`).

use crate::domain::{Result, StrataError};
use serde_json::Value;
use std::fmt;

/// Resolve a path expression against a document.
///
/// Tokens are split on `.`, `[` and `]`; empty tokens are discarded. Walking
/// a sequence requires the token to parse as a non-negative index; walking an
/// object requires the token to be a present key. Any scalar or null node
/// with tokens remaining resolves to `None`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use strata::core::path::resolve;
///
/// let doc = json!({"users": [{"age": 30}]});
/// assert_eq!(resolve(&doc, "users[0].age"), Some(&json!(30)));
/// assert_eq!(resolve(&doc, "users[1].age"), None);
/// ```
pub fn resolve<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = document;
    for token in split_tokens(path) {
        current = step(current, token)?;
    }
    Some(current)
}

fn split_tokens(path: &str) -> impl Iterator<Item = &str> {
    path.split(['.', '[', ']']).filter(|t| !t.is_empty())
}

fn step<'a>(node: &'a Value, token: &str) -> Option<&'a Value> {
    match node {
        Value::Array(items) => {
            let index: usize = token.parse().ok()?;
            items.get(index)
        }
        Value::Object(map) => map.get(token),
        _ => None,
    }
}

/// A validated path expression
///
/// Field specs parse their path expressions once at construction, so a
/// malformed expression surfaces at startup instead of mid-batch. The parsed
/// token list is reused for every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    tokens: Vec<String>,
}

impl FieldPath {
    /// Parse and validate a path expression.
    ///
    /// # Errors
    ///
    /// Returns [`StrataError::InvalidFieldPath`] when the expression has no
    /// tokens, has unbalanced brackets, or indexes with a non-numeric token.
    pub fn parse(expr: impl Into<String>) -> Result<Self> {
        let raw = expr.into();
        let invalid = |reason: &str| StrataError::InvalidFieldPath {
            path: raw.clone(),
            reason: reason.to_string(),
        };

        let mut depth = 0usize;
        for (i, c) in raw.char_indices() {
            match c {
                '[' => {
                    if depth > 0 {
                        return Err(invalid("nested '[' is not allowed"));
                    }
                    depth = 1;
                    let rest = &raw[i + 1..];
                    let close = rest.find(']').ok_or_else(|| invalid("unclosed '['"))?;
                    let index = &rest[..close];
                    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                        return Err(invalid("bracket index must be a non-negative integer"));
                    }
                }
                ']' => {
                    if depth == 0 {
                        return Err(invalid("']' without matching '['"));
                    }
                    depth = 0;
                }
                _ => {}
            }
        }
        if depth > 0 {
            return Err(invalid("unclosed '['"));
        }

        let tokens: Vec<String> = split_tokens(&raw).map(str::to_string).collect();
        if tokens.is_empty() {
            return Err(invalid("expression has no tokens"));
        }

        Ok(Self { raw, tokens })
    }

    /// The original expression text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Resolve this path against a document using the pre-parsed tokens.
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut current = document;
        for token in &self.tokens {
            current = step(current, token)?;
        }
        Some(current)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_object_member() {
        let doc = json!({"person": {"name": "John"}});
        assert_eq!(resolve(&doc, "person.name"), Some(&json!("John")));
    }

    #[test]
    fn test_resolve_sequence_index() {
        let doc = json!({"users": [{"age": 30}]});
        assert_eq!(resolve(&doc, "users[0].age"), Some(&json!(30)));
    }

    #[test]
    fn test_resolve_absent_path_is_none() {
        let doc = json!({});
        assert_eq!(resolve(&doc, "a.b"), None);
    }

    #[test]
    fn test_resolve_out_of_range_index() {
        let doc = json!({"users": [{"age": 30}]});
        assert_eq!(resolve(&doc, "users[3].age"), None);
    }

    #[test]
    fn test_resolve_non_numeric_token_against_sequence() {
        let doc = json!({"users": [{"age": 30}]});
        assert_eq!(resolve(&doc, "users.first"), None);
    }

    #[test]
    fn test_resolve_scalar_with_tokens_remaining() {
        let doc = json!({"status": "active"});
        assert_eq!(resolve(&doc, "status.code"), None);
    }

    #[test]
    fn test_resolve_present_null_is_distinguishable() {
        let doc = json!({"provider": null});
        assert_eq!(resolve(&doc, "provider"), Some(&Value::Null));
        assert_eq!(resolve(&doc, "missing"), None);
    }

    #[test]
    fn test_resolve_does_not_mutate() {
        let doc = json!({"a": [{"b": 1}]});
        let before = doc.clone();
        let _ = resolve(&doc, "a[0].b");
        let _ = resolve(&doc, "a[9].z");
        assert_eq!(doc, before);
    }

    #[test]
    fn test_field_path_parse_mixed_nesting() {
        let path = FieldPath::parse("diagnosis[0].diagnosisCodeableConcept.coding[0].code").unwrap();
        let doc = json!({
            "diagnosis": [{
                "diagnosisCodeableConcept": {"coding": [{"code": "S06"}]}
            }]
        });
        assert_eq!(path.resolve(&doc), Some(&json!("S06")));
    }

    #[test]
    fn test_field_path_rejects_empty() {
        assert!(FieldPath::parse("").is_err());
        assert!(FieldPath::parse("...").is_err());
    }

    #[test]
    fn test_field_path_rejects_bad_brackets() {
        assert!(FieldPath::parse("a[x]").is_err());
        assert!(FieldPath::parse("a[0").is_err());
        assert!(FieldPath::parse("a]0[").is_err());
        assert!(FieldPath::parse("a[]").is_err());
    }

    #[test]
    fn test_field_path_accepts_plain_key() {
        let path = FieldPath::parse("status").unwrap();
        assert_eq!(path.as_str(), "status");
        assert_eq!(path.resolve(&json!({"status": "draft"})), Some(&json!("draft")));
    }
}
