//! Scanner error types.

/// Errors from a scan.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The embedding provider failed while embedding a scannable line.
    #[error("embedding provider error: {0}")]
    Embedding(#[from] lens_embeddings::EmbeddingError),

    /// The vector index failed during a `top_k` query or metadata read.
    #[error("index error: {0}")]
    Index(#[from] lens_index::IndexError),

    /// The embedding provider in use does not match the one the index
    /// was baked with. Fatal; the caller must rebake.
    #[error("calibration model mismatch: index was baked with {baked}, scanner uses {current}")]
    CalibrationModelMismatch { baked: String, current: String },

    /// The scan was cancelled via its [`crate::CancellationToken`].
    #[error("scan cancelled")]
    Cancelled,
}
