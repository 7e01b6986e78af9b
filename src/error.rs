/// Broad classification of a [`QueryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A structurally invalid call
    Usage,
    /// A recognized clause called with an option it does not accept
    Validation,
}

/// Errors that abort a query build.
///
/// Every error is raised at the offending call and propagates out of the
/// caller's closure with `?`; no partial document is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// Structurally invalid call (nested filter, bad sort value, ...)
    Usage(String),

    /// Unrecognized operation called with arguments
    UnresolvedOperation { name: String, arity: usize },

    /// Option key outside a clause's allow-list
    InvalidOption { clause: String, option: String },
}

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::Usage(_) | QueryError::UnresolvedOperation { .. } => ErrorKind::Usage,
            QueryError::InvalidOption { .. } => ErrorKind::Validation,
        }
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::Usage(msg) => write!(f, "Usage error: {}", msg),
            QueryError::UnresolvedOperation { name, arity } => write!(
                f,
                "Usage error: unresolved operation '{}' called with {} argument(s)",
                name, arity
            ),
            QueryError::InvalidOption { clause, option } => {
                write!(f, "Validation error: '{}' is not a valid {} option", option, clause)
            }
        }
    }
}

impl std::error::Error for QueryError {}
