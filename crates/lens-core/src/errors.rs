//! Cross-cutting error types for the lens engine.
//!
//! Mirrors the error taxonomy laid out for the whole system: each kind
//! here is surfaced distinctly rather than collapsed into a single
//! catch-all, so callers can match on what actually went wrong.

use thiserror::Error;

/// Errors that can be raised by any lens-engine crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("not found: {kind} {id}")]
    NotFound { kind: String, id: String },

    /// A value failed validation (schema, format, range).
    #[error("validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors from lower layers.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
