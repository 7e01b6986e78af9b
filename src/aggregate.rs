use crate::value::{Object, ToDocument, Value};

/// One registered aggregation: `function` applied to `field`, published
/// under `alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateField {
    function: String,
    field: String,
    alias: String,
}

impl AggregateField {
    pub fn new(function: impl Into<String>, field: impl Into<String>) -> Self {
        let function = function.into();
        let field = field.into();
        let alias = format!("{}_{}", field, function);
        AggregateField {
            function,
            field,
            alias,
        }
    }

    /// Publish this aggregation under a different name.
    pub fn alias(&mut self, alias: impl Into<String>) -> &mut Self {
        self.alias = alias.into();
        self
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn name(&self) -> &str {
        &self.alias
    }

    fn to_entry(&self) -> Value {
        Value::pair(
            self.function.clone(),
            Value::pair("field", self.field.clone()),
        )
    }
}

/// Accumulator for the `aggs` section of a query.
///
/// Functions are open-ended: [`Aggregate::add`] accepts any engine function
/// name, and the common ones have named shortcuts.
///
/// ```
/// use search_dsl::Builder;
/// use serde_json::json;
///
/// let doc = Builder::build(|q| {
///     q.aggregate(|a| {
///         a.min("foo");
///         a.max("foo").alias("biggest_foo");
///         Ok(())
///     })?;
///     Ok(())
/// })
/// .unwrap();
///
/// assert_eq!(
///     doc["query"]["aggs"],
///     json!({"foo_min": {"min": {"field": "foo"}}, "biggest_foo": {"max": {"field": "foo"}}})
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    aggregations: Vec<AggregateField>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `function` over `field`; the returned entry can be renamed.
    pub fn add(&mut self, function: &str, field: &str) -> &mut AggregateField {
        log::trace!("registering {} aggregation on '{}'", function, field);
        let index = self.aggregations.len();
        self.aggregations.push(AggregateField::new(function, field));
        &mut self.aggregations[index]
    }

    pub fn min(&mut self, field: &str) -> &mut AggregateField {
        self.add("min", field)
    }

    pub fn max(&mut self, field: &str) -> &mut AggregateField {
        self.add("max", field)
    }

    pub fn sum(&mut self, field: &str) -> &mut AggregateField {
        self.add("sum", field)
    }

    pub fn avg(&mut self, field: &str) -> &mut AggregateField {
        self.add("avg", field)
    }

    pub fn value_count(&mut self, field: &str) -> &mut AggregateField {
        self.add("value_count", field)
    }

    pub fn cardinality(&mut self, field: &str) -> &mut AggregateField {
        self.add("cardinality", field)
    }

    pub fn stats(&mut self, field: &str) -> &mut AggregateField {
        self.add("stats", field)
    }

    pub fn extended_stats(&mut self, field: &str) -> &mut AggregateField {
        self.add("extended_stats", field)
    }

    pub fn percentiles(&mut self, field: &str) -> &mut AggregateField {
        self.add("percentiles", field)
    }

    pub fn terms(&mut self, field: &str) -> &mut AggregateField {
        self.add("terms", field)
    }

    pub fn entries(&self) -> &[AggregateField] {
        &self.aggregations
    }

    /// All entries keyed by alias. A repeated alias keeps its first position
    /// and takes the last registration's body.
    pub fn finalize(&self) -> Value {
        let mut out = Object::new();
        for aggregation in &self.aggregations {
            out.insert(aggregation.alias.clone(), aggregation.to_entry());
        }
        Value::Object(out)
    }
}

impl ToDocument for Aggregate {
    fn to_document(&self) -> Value {
        self.finalize()
    }
}
