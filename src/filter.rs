use std::ops::{Deref, DerefMut};

use crate::{
    builder::Builder,
    error::QueryError,
    value::Document,
};

/// A builder that produces one `filtered` entry.
///
/// Its own clauses (declared through the usual [`Builder`] operations, which
/// are reachable through `Deref`) become the `filter` half of the entry; an
/// optional nested query declared with [`Filter::query`] becomes the `query`
/// half. The two are emitted side by side, never nested.
#[derive(Debug)]
pub struct Filter {
    builder: Builder,
    query: Option<Document>,
}

impl Default for Filter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter {
    pub fn new() -> Self {
        Filter {
            builder: Builder::with_default_context(false),
            query: None,
        }
    }

    /// Filters cannot be nested; this always fails.
    pub fn filter<F>(&mut self, _procedure: F) -> Result<&mut Self, QueryError>
    where
        F: FnOnce(&mut Filter) -> Result<(), QueryError>,
    {
        Err(QueryError::Usage("can't filter from a filter".to_string()))
    }

    /// Attaches the query this filter narrows. A second call replaces the
    /// first.
    pub fn query<F>(&mut self, procedure: F) -> Result<&mut Self, QueryError>
    where
        F: FnOnce(&mut Builder) -> Result<(), QueryError>,
    {
        self.query = Some(Builder::build(procedure)?);
        Ok(self)
    }

    pub fn finalize(self) -> Document {
        let mut out = match self.query {
            Some(Document::Object(query)) => query,
            _ => serde_json::Map::new(),
        };

        let clauses = self.builder.into_clauses();
        if clauses.as_object().is_some_and(|c| !c.is_empty()) {
            out.insert("filter".to_string(), clauses);
        }
        log::debug!(
            "finalized filter (query: {}, filter: {})",
            out.contains_key("query"),
            out.contains_key("filter")
        );
        Document::Object(out)
    }
}

impl Deref for Filter {
    type Target = Builder;

    fn deref(&self) -> &Builder {
        &self.builder
    }
}

impl DerefMut for Filter {
    fn deref_mut(&mut self) -> &mut Builder {
        &mut self.builder
    }
}
