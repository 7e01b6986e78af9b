//! Conversion from build-time values to canonical documents.
//!
//! Everything a builder stores passes through [`canonicalize`] before it is
//! handed to a parent or returned to the caller. Mappings and sequences are
//! walked in order, deferred buildables are asked for their own form and that
//! result is normalized in turn, and scalars pass through unchanged.

use crate::value::{Document, Value};

/// Recursively reduce a [`Value`] to a plain [`Document`].
///
/// Non-finite floats have no JSON representation and become `null`.
pub fn canonicalize(value: Value) -> Document {
    match value {
        Value::Null => Document::Null,
        Value::Boolean(b) => Document::Bool(b),
        Value::Integer(i) => Document::Number(i.into()),
        Value::Unsigned(u) => Document::Number(u.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Document::Number)
            .unwrap_or(Document::Null),
        Value::String(s) => Document::String(s),
        Value::Array(arr) => Document::Array(arr.into_iter().map(canonicalize).collect()),
        Value::Object(obj) => Document::Object(
            obj.into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect(),
        ),
        Value::Deferred(item) => canonicalize(item.to_document()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ToDocument;
    use serde_json::json;

    #[derive(Debug)]
    struct Nested;

    impl ToDocument for Nested {
        fn to_document(&self) -> Value {
            Value::pair("inner", Value::deferred(Leaf))
        }
    }

    #[derive(Debug)]
    struct Leaf;

    impl ToDocument for Leaf {
        fn to_document(&self) -> Value {
            Value::from(vec![1, 2])
        }
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(canonicalize(Value::from("x")), json!("x"));
        assert_eq!(canonicalize(Value::from(3)), json!(3));
        assert_eq!(canonicalize(Value::from(2.5)), json!(2.5));
        assert_eq!(canonicalize(Value::Null), json!(null));
    }

    #[test]
    fn test_large_unsigned_stays_exact() {
        assert_eq!(canonicalize(Value::from(u64::MAX)), json!(u64::MAX));
        assert_eq!(canonicalize(Value::from(json!(u64::MAX))), json!(u64::MAX));
    }

    #[test]
    fn test_non_finite_float_becomes_null() {
        assert_eq!(canonicalize(Value::Float(f64::NAN)), json!(null));
    }

    #[test]
    fn test_deferred_values_resolve_recursively() {
        let mut outer = crate::value::Object::new();
        outer.insert("z".into(), Value::from(true));
        outer.insert("a".into(), Value::Array(vec![Value::deferred(Nested)]));

        let doc = canonicalize(Value::Object(outer));
        assert_eq!(doc, json!({"z": true, "a": [{"inner": [1, 2]}]}));

        let keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
