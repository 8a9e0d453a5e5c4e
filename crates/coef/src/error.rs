//! COEF error types (spec §7).

/// Errors from the blob store, wire grammar, or executor.
#[derive(Debug, thiserror::Error)]
pub enum CoefError {
    /// `DuckDB` operation failed.
    #[error("duckdb error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// Requested blob hash is not present in the store.
    #[error("content missing: {0}")]
    ContentMissing(String),

    /// An instruction named a verb outside the closed nine-verb set.
    #[error("unknown verb: {0}")]
    UnknownVerb(String),

    /// A verb's required argument was not supplied.
    #[error("missing required argument {arg} for verb {verb}")]
    ArgumentMissing { verb: String, arg: String },

    /// A text-oriented verb (`rename`, `regex`) received non-UTF-8 input.
    #[error("invalid utf-8 input for verb {0}")]
    EncodingError(String),

    /// A `verify:hash=` post-condition did not match the program's output.
    #[error("integrity failure: expected {expected}, got {actual}")]
    IntegrityFailure { expected: String, actual: String },

    /// The wire grammar itself could not be parsed.
    #[error("malformed instruction: {0}")]
    MalformedInstruction(String),

    /// An invalid regex pattern was supplied to the `regex` verb.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(String),
}
