pub mod aggregate;
pub mod builder;
pub mod canonical;
pub mod error;
pub mod field;
pub mod filter;
pub mod index;
pub mod merge;
pub mod output;
pub mod value;

pub use aggregate::{Aggregate, AggregateField};
pub use builder::{Builder, QUERY_STRING_OPTIONS, VERBS};
pub use canonical::canonicalize;
pub use error::{ErrorKind, QueryError};
pub use field::{Condition, Field, PatternSource};
pub use filter::Filter;
pub use index::{Index, SearchClient, SearchError};
pub use output::{to_json, to_json_pretty};
pub use value::{Document, Object, ToDocument, Value};

/// Builds a query document from a closure run against a root [`Builder`].
///
/// ```
/// use serde_json::json;
///
/// let doc = search_dsl::build(|q| {
///     q.field("x").is("y");
///     Ok(())
/// })
/// .unwrap();
///
/// assert_eq!(doc, json!({"query": {"bool": {"must": [{"term": {"x": "y"}}]}}}));
/// ```
pub fn build<F>(procedure: F) -> Result<Document, QueryError>
where
    F: FnOnce(&mut Builder) -> Result<(), QueryError>,
{
    Builder::build(procedure)
}
