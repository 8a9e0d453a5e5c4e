//! Baker/Calibrator error types.

/// Errors from the calibration pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    /// The reference corpus failed to parse.
    #[error("corpus parse error: {0}")]
    Corpus(#[from] lens_corpus::CorpusError),

    /// The embedding provider failed while embedding reference examples.
    #[error("embedding provider error: {0}")]
    Embedding(#[from] lens_embeddings::EmbeddingError),

    /// The vector index failed while writing records or metadata.
    #[error("index error: {0}")]
    Index(#[from] lens_index::IndexError),

    /// No lens survived corpus parsing (every lens was underpopulated).
    #[error("no lenses with examples in both poles were found in the corpus")]
    NoLenses,
}
