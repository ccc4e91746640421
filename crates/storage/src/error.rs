//! Storage error type.

use std::path::PathBuf;

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while reading a run's store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store file does not exist
    #[error("store not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The store exists but could not be opened
    #[error("cannot open store {}: {source}", .path.display())]
    Connect {
        /// Store path
        path: PathBuf,
        /// Underlying driver error
        #[source]
        source: sqlx::Error,
    },

    /// A query against the store failed
    #[error("query failed ({context}): {source}")]
    Query {
        /// What was being read
        context: &'static str,
        /// Underlying driver error
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    /// Build a mapper that wraps a driver error with query context.
    pub(crate) fn query(context: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
        move |source| StoreError::Query { context, source }
    }
}
