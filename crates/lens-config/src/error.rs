//! Configuration error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// `EMBEDDING_MODEL_ID` has no configured value and no default applies.
    #[error("EMBEDDING_MODEL_ID is not set and no default embedding model is configured")]
    MissingModelId,

    /// An accelerator overrides file could not be parsed.
    #[error("invalid accelerators file at {path}: {reason}")]
    InvalidAccelerators { path: String, reason: String },
}
