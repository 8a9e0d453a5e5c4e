//! `DuckDB` table DDL for the local vector index.

/// Reference examples table. Embeddings are stored as `FLOAT[]`
/// (variable-length) and cast to `FLOAT[dimension]` at query time, since
/// `DuckDB`'s fixed-length array functions need a concrete width.
pub const CREATE_REFERENCE_EXAMPLES: &str = "
CREATE TABLE IF NOT EXISTS reference_examples (
    id TEXT NOT NULL,
    lens_name TEXT NOT NULL,
    pole TEXT NOT NULL,
    text TEXT NOT NULL,
    embedding FLOAT[],
    PRIMARY KEY (id)
);
CREATE INDEX IF NOT EXISTS idx_reference_examples_lens_pole
    ON reference_examples(lens_name, pole);
";

/// Key-value metadata table: calibration record, dimension, and any other
/// index-level metadata.
pub const CREATE_INDEX_META: &str = "
CREATE TABLE IF NOT EXISTS index_meta (
    key TEXT NOT NULL,
    value JSON NOT NULL,
    PRIMARY KEY (key)
);
";

/// Meta key under which the fixed embedding dimension is recorded.
pub const DIMENSION_KEY: &str = "__dimension__";
