//! Vector Index error types.

/// Errors from the vector index storage layer.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// `DuckDB` operation failed.
    #[error("duckdb error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// Index file exists but its schema or metadata is unreadable.
    #[error("index corrupt: {0}")]
    Corrupt(String),

    /// Requested metadata key does not exist.
    #[error("metadata key not found: {0}")]
    MetaNotFound(String),
}
