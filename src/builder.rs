//! # Query Builder
//!
//! [`Builder`] turns a closure of declarative calls into a query document.
//!
//! ## Default context
//!
//! The outermost builder (and the query nested inside a filter) runs in the
//! *default context*: bare clauses declared there are wrapped in an implicit
//! `must` group, and the finalized document is wrapped as
//! `{"query": ..., "sort": ...}`. Builders created for `must`, `must_not` and
//! `should` groups are not in the default context and return their clauses
//! unwrapped.
//!
//! ## Example
//!
//! ```
//! use search_dsl::Builder;
//! use serde_json::json;
//!
//! let doc = Builder::build(|q| {
//!     q.must(|q| {
//!         q.field("status").is("active");
//!         Ok(())
//!     })?;
//!     q.should(|q| {
//!         q.field("title").matches("rust");
//!         Ok(())
//!     })?;
//!     q.sort("created_at", "DESC")?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! assert_eq!(
//!     doc,
//!     json!({
//!         "query": {"bool": {
//!             "must": [{"term": {"status": "active"}}],
//!             "should": [{"match": {"title": {"query": "rust"}}}]
//!         }},
//!         "sort": [{"created_at": {"order": "desc"}}]
//!     })
//! );
//! ```

use crate::{
    aggregate::Aggregate,
    canonical::canonicalize,
    error::QueryError,
    field::{Condition, Field},
    filter::Filter,
    merge::{deep_merge, overlay},
    value::{Document, Object, Value},
};

/// Options accepted by `query_string`.
pub const QUERY_STRING_OPTIONS: &[&str] = &[
    "query",
    "default_field",
    "default_operator",
    "analyzer",
    "allow_leading_wildcard",
    "lowercase_expanded_terms",
    "enable_position_increments",
    "fuzzy_max_expansions",
    "fuzziness",
    "fuzzy_prefix_length",
    "phrase_slop",
    "boost",
    "analyze_wildcard",
    "auto_generate_phrase_queries",
    "minimum_should_match",
    "lenient",
    "locale",
];

/// Operation names with a dedicated builder method. They can never be used
/// as implicit field declarations.
pub const VERBS: &[&str] = &[
    "query_string",
    "multi_match",
    "must",
    "must_not",
    "should",
    "field",
    "filter",
    "aggregate",
    "sort",
    "finalize",
];

/// Convert caller-supplied options into an ordered object.
///
/// `null` means "no options"; anything other than an object is rejected.
pub(crate) fn options_map(clause: &str, options: Document) -> Result<Object, QueryError> {
    match Value::from(options) {
        Value::Null => Ok(Object::new()),
        Value::Object(map) => Ok(map),
        _ => Err(QueryError::Usage(format!("{} options must be an object", clause))),
    }
}

/// Normalize a sort criterion into its document form.
fn sort_criteria(criteria: Document) -> Result<Value, QueryError> {
    if criteria.is_object() {
        return Ok(Value::from(criteria));
    }
    let order = match &criteria {
        Document::String(s) => match s.to_ascii_lowercase().as_str() {
            "asc" => "asc",
            "desc" => "desc",
            _ => {
                return Err(QueryError::Usage(format!(
                    "invalid sort order '{}', expected 'asc' or 'desc'",
                    s
                )));
            }
        },
        Document::Number(n) => match n.as_i64() {
            Some(1) => "asc",
            Some(-1) => "desc",
            _ => {
                return Err(QueryError::Usage(format!(
                    "invalid sort direction {}, expected 1 or -1",
                    n
                )));
            }
        },
        other => {
            return Err(QueryError::Usage(format!("invalid sort criteria {}", other)));
        }
    };
    Ok(Value::pair("order", order))
}

/// Mutable context that accumulates clauses, fields and sort criteria.
#[derive(Debug)]
pub struct Builder {
    clauses: Object,
    fields: Vec<Field>,
    sort: Vec<(String, Value)>,
    default_context: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Creates a root builder (default context).
    pub fn new() -> Self {
        Self::with_default_context(true)
    }

    pub fn with_default_context(default_context: bool) -> Self {
        Builder {
            clauses: Object::new(),
            fields: Vec::new(),
            sort: Vec::new(),
            default_context,
        }
    }

    /// Runs `procedure` against a fresh root builder and finalizes it.
    ///
    /// Any error raised by a call inside the closure aborts the build.
    pub fn build<F>(procedure: F) -> Result<Document, QueryError>
    where
        F: FnOnce(&mut Builder) -> Result<(), QueryError>,
    {
        let mut builder = Builder::new();
        if let Err(e) = procedure(&mut builder) {
            log::debug!("query build aborted: {}", e);
            return Err(e);
        }
        Ok(builder.finalize())
    }

    pub fn is_default_context(&self) -> bool {
        self.default_context
    }

    /// Free-text `query_string` clause.
    ///
    /// Option keys are checked against [`QUERY_STRING_OPTIONS`] before
    /// anything is stored.
    pub fn query_string(
        &mut self,
        text: &str,
        options: Document,
    ) -> Result<&mut Self, QueryError> {
        let mut options = options_map("query_string", options)?;
        if let Some(option) = options
            .keys()
            .find(|key| !QUERY_STRING_OPTIONS.contains(&key.as_str()))
        {
            return Err(QueryError::InvalidOption {
                clause: "query_string".to_string(),
                option: option.clone(),
            });
        }

        let mut query = Object::new();
        query.insert("query".to_string(), Value::from(text));
        overlay(&mut options, query);

        self.in_default_context(move |q| {
            q.store("query_string", Value::Object(options));
            Ok(())
        })
    }

    /// `multi_match` clause across `fields`. Options are passed through.
    pub fn multi_match<I, T>(
        &mut self,
        text: &str,
        fields: I,
        options: Document,
    ) -> Result<&mut Self, QueryError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut options = options_map("multi_match", options)?;
        let fields: Vec<Value> = fields.into_iter().map(|f| Value::String(f.into())).collect();

        let mut query = Object::new();
        query.insert("query".to_string(), Value::from(text));
        query.insert("fields".to_string(), Value::Array(fields));
        overlay(&mut options, query);

        self.in_default_context(move |q| {
            q.store("multi_match", Value::Object(options));
            Ok(())
        })
    }

    pub fn must<F>(&mut self, procedure: F) -> Result<&mut Self, QueryError>
    where
        F: FnOnce(&mut Builder) -> Result<(), QueryError>,
    {
        self.bool_group(Condition::Must, procedure)
    }

    pub fn must_not<F>(&mut self, procedure: F) -> Result<&mut Self, QueryError>
    where
        F: FnOnce(&mut Builder) -> Result<(), QueryError>,
    {
        self.bool_group(Condition::MustNot, procedure)
    }

    pub fn should<F>(&mut self, procedure: F) -> Result<&mut Self, QueryError>
    where
        F: FnOnce(&mut Builder) -> Result<(), QueryError>,
    {
        self.bool_group(Condition::Should, procedure)
    }

    /// Declares constraints on field `name`.
    ///
    /// In the default context the field is routed to the implicit `must`
    /// group; calling [`Field::must_not`] or [`Field::should`] reroutes it.
    ///
    /// A field declared without any operator still takes its slot: at the
    /// root, a bare `q.field("x")` finalizes to
    /// `{"query": {"bool": {"must": [{}]}}}`.
    pub fn field(&mut self, name: &str) -> &mut Field {
        let mut field = Field::new(name);
        if self.default_context {
            field.route(Condition::Must);
        }
        log::trace!("registering field '{}'", name);
        let index = self.fields.len();
        self.fields.push(field);
        &mut self.fields[index]
    }

    /// Appends a filtered query built by `procedure` to `filtered`.
    pub fn filter<F>(&mut self, procedure: F) -> Result<&mut Self, QueryError>
    where
        F: FnOnce(&mut Filter) -> Result<(), QueryError>,
    {
        let mut filter = Filter::new();
        procedure(&mut filter)?;
        let document = filter.finalize();
        self.slot("filtered").make_array().push(Value::from(document));
        Ok(self)
    }

    /// Registers the query's aggregations. Only the first call has any
    /// effect; later calls do not run `procedure` at all.
    pub fn aggregate<F>(&mut self, procedure: F) -> Result<&mut Self, QueryError>
    where
        F: FnOnce(&mut Aggregate) -> Result<(), QueryError>,
    {
        if self.clauses.contains_key("aggs") {
            log::trace!("aggregations already registered, ignoring");
            return Ok(self);
        }
        let mut aggregate = Aggregate::new();
        procedure(&mut aggregate)?;
        self.store("aggs", Value::deferred(aggregate));
        Ok(self)
    }

    /// Appends a sort criterion.
    ///
    /// `criteria` may be `"asc"`/`"desc"` in any case, `1`/`-1`, or an
    /// object used verbatim.
    pub fn sort(
        &mut self,
        field: &str,
        criteria: impl Into<Document>,
    ) -> Result<&mut Self, QueryError> {
        let criteria = sort_criteria(criteria.into())?;
        self.sort.push((field.to_string(), criteria));
        Ok(self)
    }

    /// Dynamic entry point for operations named at runtime.
    ///
    /// An unrecognized name called without arguments declares a field of that
    /// name; called with arguments it is an unresolved operation.
    pub fn call(&mut self, name: &str, args: &[Document]) -> Result<&mut Field, QueryError> {
        if VERBS.contains(&name) {
            return Err(QueryError::Usage(format!(
                "'{}' is a builder operation and cannot be dispatched by name",
                name
            )));
        }
        if !args.is_empty() {
            return Err(QueryError::UnresolvedOperation {
                name: name.to_string(),
                arity: args.len(),
            });
        }
        Ok(self.field(name))
    }

    /// Consumes the builder and produces its document.
    pub fn finalize(mut self) -> Document {
        let default_context = self.default_context;
        let sort = std::mem::take(&mut self.sort);
        let clauses = self.into_clauses();

        if !default_context {
            return clauses;
        }

        let mut root = serde_json::Map::new();
        root.insert("query".to_string(), clauses);
        if !sort.is_empty() {
            let sort: Vec<Value> = sort
                .into_iter()
                .map(|(field, criteria)| Value::pair(field, criteria))
                .collect();
            root.insert("sort".to_string(), canonicalize(Value::Array(sort)));
        }
        log::debug!("finalized query document with {} top-level key(s)", root.len());
        Document::Object(root)
    }

    /// Stored clauses merged with every field's payload, canonicalized.
    pub(crate) fn into_clauses(self) -> Document {
        let mut clauses = self.clauses;
        for field in self.fields {
            let payload = field.finalize();
            match field.condition() {
                Some(condition) => {
                    let group = clauses
                        .entry("bool".to_string())
                        .or_insert_with(Value::object)
                        .make_object();
                    group
                        .entry(condition.as_str().to_string())
                        .or_insert_with(|| Value::Array(Vec::new()))
                        .make_array()
                        .push(payload);
                }
                None => {
                    if let Value::Object(payload) = payload {
                        deep_merge(&mut clauses, payload);
                    }
                }
            }
        }
        canonicalize(Value::Object(clauses))
    }

    fn in_default_context<F>(&mut self, procedure: F) -> Result<&mut Self, QueryError>
    where
        F: FnOnce(&mut Builder) -> Result<(), QueryError>,
    {
        if self.default_context {
            self.must(procedure)
        } else {
            procedure(&mut *self)?;
            Ok(self)
        }
    }

    fn bool_group<F>(
        &mut self,
        condition: Condition,
        procedure: F,
    ) -> Result<&mut Self, QueryError>
    where
        F: FnOnce(&mut Builder) -> Result<(), QueryError>,
    {
        let mut group = Builder::with_default_context(false);
        procedure(&mut group)?;
        let document = group.finalize();

        self.slot("bool")
            .make_object()
            .entry(condition.as_str().to_string())
            .or_insert_with(|| Value::Array(Vec::new()))
            .make_array()
            .push(Value::from(document));
        Ok(self)
    }

    fn store(&mut self, clause: &str, value: Value) {
        log::trace!("storing '{}' clause", clause);
        self.clauses.insert(clause.to_string(), value);
    }

    fn slot(&mut self, clause: &str) -> &mut Value {
        self.clauses.entry(clause.to_string()).or_insert(Value::Null)
    }
}
