//! JSON rendering for finalized query documents.
//!
//! Object keys are emitted in insertion order, which the builder keeps
//! deterministic, so the same call sequence always renders to the same text.
//!
//! # Examples
//!
//! ```
//! use search_dsl::output::{to_json, to_json_pretty};
//! use serde_json::json;
//!
//! let doc = json!({"query": {"term": {"x": "y"}}});
//!
//! assert_eq!(to_json(&doc), r#"{"query":{"term":{"x":"y"}}}"#);
//! assert!(to_json_pretty(&doc).starts_with("{\n  \"query\""));
//! ```

use crate::value::Document;

/// Compact JSON with no extra whitespace, suitable for a request body.
pub fn to_json(document: &Document) -> String {
    document.to_string()
}

/// Human-readable JSON with 2-space indentation.
pub fn to_json_pretty(document: &Document) -> String {
    // Serializing a `serde_json::Value` into a string cannot fail.
    serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string())
}
