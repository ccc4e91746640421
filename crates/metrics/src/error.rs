//! Extraction errors.

use runlens_storage::StoreError;
use std::path::PathBuf;

/// Result type for extraction.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Fatal errors for one run. A run that fails yields no snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The store file does not exist
    #[error("store not found: {}", .0.display())]
    StoreNotFound(PathBuf),

    /// A mandatory query failed, or the store could not be opened
    #[error("{context}: {source}")]
    Query {
        /// What was being read
        context: String,
        /// Underlying driver error
        #[source]
        source: sqlx::Error,
    },
}

impl From<StoreError> for ExtractError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(path) => ExtractError::StoreNotFound(path),
            StoreError::Connect { path, source } => ExtractError::Query {
                context: format!("opening {}", path.display()),
                source,
            },
            StoreError::Query { context, source } => ExtractError::Query {
                context: context.to_string(),
                source,
            },
        }
    }
}
