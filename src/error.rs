//! Error types for kgraph.
//!
//! Three kinds, matching how a caller should react:
//! - `InvalidArgument` - the payload itself is wrong; fix the call
//! - `EntityNotFound` - a relation/observation referenced a missing entity
//! - `StoreUnavailable` - the backing store failed; retry is the caller's call
//!
//! `Encoding` covers a result that could not be turned into JSON.

use thiserror::Error;

/// Result type alias using kgraph's error type.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised by the graph engine.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Malformed or empty identifiers. Raised before the store is touched.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation referenced an entity that does not exist.
    #[error("Entity not found: {name}")]
    EntityNotFound { name: String },

    /// Connection or transaction failure in the backing store.
    #[error("Store unavailable: {context}{}", cause_suffix(.source))]
    StoreUnavailable {
        context: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    /// A result could not be encoded as JSON.
    #[error("Failed to encode result: {0}")]
    Encoding(#[from] serde_json::Error),
}

fn cause_suffix(source: &Option<rusqlite::Error>) -> String {
    source.as_ref().map(|e| format!(": {}", e)).unwrap_or_default()
}

impl GraphError {
    /// Create an invalid-argument error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an entity-not-found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::EntityNotFound { name: name.into() }
    }

    /// Wrap a store error with what we were doing when it happened.
    pub fn store(context: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::StoreUnavailable {
            context: context.into(),
            source: Some(source),
        }
    }

    /// The store can't serve the request, with no SQLite error behind it.
    pub fn unavailable(context: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            context: context.into(),
            source: None,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}

/// Attach context to rusqlite results, turning them into `StoreUnavailable`.
pub(crate) trait StoreContext<T> {
    fn store_context(self, context: &str) -> Result<T>;
}

impl<T> StoreContext<T> for std::result::Result<T, rusqlite::Error> {
    fn store_context(self, context: &str) -> Result<T> {
        self.map_err(|e| GraphError::store(context, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_missing_entity() {
        let err = GraphError::not_found("Bob");
        assert_eq!(err.to_string(), "Entity not found: Bob");
    }

    #[test]
    fn test_store_context_wraps_source() {
        let raw: std::result::Result<(), rusqlite::Error> =
            Err(rusqlite::Error::InvalidQuery);
        let err = raw.store_context("reading graph").unwrap_err();

        assert!(err.is_store_unavailable());
        assert!(err.to_string().starts_with("Store unavailable: reading graph"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_unavailable_without_sqlite_cause() {
        let err = GraphError::unavailable("no shared connection");

        assert!(err.is_store_unavailable());
        assert_eq!(err.to_string(), "Store unavailable: no shared connection");
        assert!(std::error::Error::source(&err).is_none());
    }
}
