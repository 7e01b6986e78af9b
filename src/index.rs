//! Binding between built queries and a search client.
//!
//! The crate ships no client. Anything that can send a finalized document to
//! a cluster implements [`SearchClient`], and [`Index`] takes care of building
//! the document and naming the target.

use crate::{
    builder::{Builder, options_map},
    canonical::canonicalize,
    error::QueryError,
    value::{Document, Value},
};

/// Dispatches a finalized query document.
pub trait SearchClient {
    type Response;
    type Error;

    /// `options` already carries the target under `index`.
    fn search(
        &self,
        options: serde_json::Map<String, Document>,
        body: Document,
    ) -> Result<Self::Response, Self::Error>;
}

/// Errors from [`Index::query`].
#[derive(Debug)]
pub enum SearchError<E> {
    /// The query could not be built; nothing was sent
    Query(QueryError),
    /// The client failed
    Client(E),
}

impl<E: std::fmt::Display> std::fmt::Display for SearchError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::Query(e) => write!(f, "{}", e),
            SearchError::Client(e) => write!(f, "Search client error: {}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for SearchError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::Query(e) => Some(e),
            SearchError::Client(e) => Some(e),
        }
    }
}

impl<E> From<QueryError> for SearchError<E> {
    fn from(e: QueryError) -> Self {
        SearchError::Query(e)
    }
}

/// A named search target on a client.
#[derive(Debug)]
pub struct Index<'a, C> {
    client: &'a C,
    name: String,
}

impl<'a, C: SearchClient> Index<'a, C> {
    pub fn new(client: &'a C, name: impl Into<String>) -> Self {
        Index {
            client,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds a query with `procedure` and sends it to this index.
    ///
    /// `options` is an object (or `null`) of request options; its `index`
    /// entry is always replaced by this index's name.
    pub fn query<F>(
        &self,
        options: Document,
        procedure: F,
    ) -> Result<C::Response, SearchError<C::Error>>
    where
        F: FnOnce(&mut Builder) -> Result<(), QueryError>,
    {
        let mut options = options_map("search", options)?;
        options.insert("index".to_string(), Value::from(&self.name));

        let body = Builder::build(procedure)?;
        let options = match canonicalize(Value::Object(options)) {
            Document::Object(options) => options,
            _ => serde_json::Map::new(),
        };

        log::debug!("dispatching query to index '{}'", self.name);
        self.client.search(options, body).map_err(SearchError::Client)
    }
}
