//! Per-field constraint accumulator.
//!
//! A [`Field`] collects range bounds and term/match/terms/regex operators for
//! one document field. It never refers back to the builder that owns it: on
//! finalize it hands back its payload together with its routing
//! [`Condition`], and the builder decides where that payload lands.

use regex::Regex;

use crate::{
    builder::options_map,
    error::QueryError,
    value::{Document, Object, ToDocument, Value},
};

/// Boolean group a field's payload is routed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Must,
    MustNot,
    Should,
}

impl Condition {
    /// Key of this group inside a `bool` clause.
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Must => "must",
            Condition::MustNot => "must_not",
            Condition::Should => "should",
        }
    }
}

/// Text that can be stored as a `regex` operand.
///
/// Compiled expressions contribute only their source pattern.
pub trait PatternSource {
    fn source_text(&self) -> String;
}

impl PatternSource for str {
    fn source_text(&self) -> String {
        self.to_string()
    }
}

impl PatternSource for String {
    fn source_text(&self) -> String {
        self.clone()
    }
}

impl PatternSource for Regex {
    fn source_text(&self) -> String {
        self.as_str().to_string()
    }
}

/// Constraints on a single document field.
///
/// Returned by [`Builder::field`](crate::Builder::field) so operators can be
/// chained onto it:
///
/// ```
/// use search_dsl::Builder;
/// use serde_json::json;
///
/// let doc = Builder::build(|q| {
///     q.field("price").gte(10).lt(100);
///     Ok(())
/// })
/// .unwrap();
///
/// assert_eq!(
///     doc,
///     json!({"query": {"bool": {"must": [{"range": {"price": {"gte": 10, "lt": 100}}}]}}})
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    ranges: Object,
    ops: Object,
    condition: Option<Condition>,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            ranges: Object::new(),
            ops: Object::new(),
            condition: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn condition(&self) -> Option<Condition> {
        self.condition
    }

    // Ranges

    pub fn gt(&mut self, value: impl Into<Value>) -> &mut Self {
        self.range("gt", value.into())
    }

    pub fn lt(&mut self, value: impl Into<Value>) -> &mut Self {
        self.range("lt", value.into())
    }

    pub fn gte(&mut self, value: impl Into<Value>) -> &mut Self {
        self.range("gte", value.into())
    }

    pub fn lte(&mut self, value: impl Into<Value>) -> &mut Self {
        self.range("lte", value.into())
    }

    // Terms

    /// Exact `term` match. Calling it again replaces the previous value.
    pub fn is(&mut self, value: impl Into<Value>) -> &mut Self {
        self.op("term", value.into())
    }

    pub fn equals(&mut self, value: impl Into<Value>) -> &mut Self {
        self.is(value)
    }

    pub fn be(&mut self, value: impl Into<Value>) -> &mut Self {
        self.is(value)
    }

    // Full-text

    /// Plain `match` on `text`.
    pub fn matches(&mut self, text: impl Into<Value>) -> &mut Self {
        let mut options = Object::new();
        options.insert("query".to_string(), text.into());
        self.op("match", Value::Object(options))
    }

    /// `match` with extra options.
    ///
    /// A truthy `phrase` option selects `match_phrase`; when `phrase` is the
    /// token `"prefix"` or `prefix` is also truthy, `match_phrase_prefix` is
    /// used instead. The selector keys are removed from the stored options,
    /// everything else is passed through to the engine.
    pub fn matches_with(
        &mut self,
        text: impl Into<Value>,
        options: Document,
    ) -> Result<&mut Self, QueryError> {
        let mut options = options_map("match", options)?;
        options.insert("query".to_string(), text.into());

        let op = match options.shift_remove("phrase") {
            Some(phrase) if phrase.is_set() => {
                let prefix = options
                    .shift_remove("prefix")
                    .is_some_and(|prefix| prefix.is_set());
                if prefix || phrase.as_str() == Some("prefix") {
                    "match_phrase_prefix"
                } else {
                    "match_phrase"
                }
            }
            _ => "match",
        };

        Ok(self.op(op, Value::Object(options)))
    }

    pub fn phrase(&mut self, text: impl Into<Value>) -> &mut Self {
        let mut options = Object::new();
        options.insert("query".to_string(), text.into());
        self.op("match_phrase", Value::Object(options))
    }

    pub fn phrase_prefix(&mut self, text: impl Into<Value>) -> &mut Self {
        let mut options = Object::new();
        options.insert("query".to_string(), text.into());
        self.op("match_phrase_prefix", Value::Object(options))
    }

    // Multi-term

    /// Every value must match.
    pub fn match_all<I, T>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let count = values.len();
        self.terms(values, count)
    }

    pub fn all_of<I, T>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.match_all(values)
    }

    pub fn all<I, T>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.match_all(values)
    }

    /// At least one value must match.
    pub fn match_any<I, T>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.match_at_least(values, 1)
    }

    pub fn any_of<I, T>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.match_any(values)
    }

    pub fn match_at_least<I, T>(&mut self, values: I, minimum: usize) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        self.terms(values.into_iter().map(Into::into).collect(), minimum)
    }

    pub fn regex<P: PatternSource + ?Sized>(&mut self, pattern: &P) -> &mut Self {
        let entry = Value::pair(self.name.clone(), pattern.source_text());
        self.append("regex", entry)
    }

    // Routing

    pub fn must(&mut self) -> &mut Self {
        self.route(Condition::Must)
    }

    pub fn must_not(&mut self) -> &mut Self {
        self.route(Condition::MustNot)
    }

    pub fn should(&mut self) -> &mut Self {
        self.route(Condition::Should)
    }

    pub fn must_be(&mut self) -> &mut Self {
        self.must()
    }

    pub fn must_not_be(&mut self) -> &mut Self {
        self.must_not()
    }

    pub fn should_be(&mut self) -> &mut Self {
        self.should()
    }

    pub(crate) fn route(&mut self, condition: Condition) -> &mut Self {
        self.condition = Some(condition);
        self
    }

    /// The operator payload, with a `range` entry when any bound is set.
    pub fn finalize(&self) -> Value {
        let mut payload = self.ops.clone();
        if !self.ranges.is_empty() {
            payload.insert(
                "range".to_string(),
                Value::pair(self.name.clone(), Value::Object(self.ranges.clone())),
            );
        }
        Value::Object(payload)
    }

    fn range(&mut self, op: &str, value: Value) -> &mut Self {
        self.ranges.insert(op.to_string(), value);
        self
    }

    fn op(&mut self, op: &str, value: Value) -> &mut Self {
        let slot = self.ops.entry(op.to_string()).or_insert_with(Value::object);
        slot.make_object().insert(self.name.clone(), value);
        self
    }

    fn terms(&mut self, values: Vec<Value>, minimum: usize) -> &mut Self {
        let mut entry = Object::new();
        entry.insert(self.name.clone(), Value::Array(values));
        entry.insert("minimum_should_match".to_string(), Value::from(minimum));
        self.append("terms", Value::Object(entry))
    }

    fn append(&mut self, op: &str, entry: Value) -> &mut Self {
        let slot = self
            .ops
            .entry(op.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        slot.make_array().push(entry);
        self
    }
}

impl ToDocument for Field {
    fn to_document(&self) -> Value {
        self.finalize()
    }
}
