//! # lens-index
//!
//! Persistent, `DuckDB`-backed store for reference examples and
//! calibration metadata (spec §4.3). Brute-force cosine search via
//! `array_cosine_similarity()`, matching the dominant approach in this
//! codebase's documentation-lake storage layer before HNSW/Lance
//! backends come online.

mod meta;
mod query;
mod schema;
mod write;

use duckdb::Connection;

pub mod error;
pub use error::IndexError;
pub use query::TopKHit;

use lens_core::Pole;

/// A `DuckDB`-backed vector index of reference examples.
pub struct Index {
    conn: Connection,
    dimension: usize,
}

impl Index {
    /// Open or create a file-backed index at `path` with a fixed
    /// embedding `dimension`.
    ///
    /// If the file already has a recorded dimension, it must match the
    /// one passed in; otherwise [`IndexError::Corrupt`] is returned.
    ///
    /// # Errors
    /// Returns [`IndexError::DuckDb`] if the file cannot be opened or the
    /// schema cannot be created, or [`IndexError::Corrupt`] on a
    /// dimension mismatch.
    pub fn open(path: &str, dimension: usize) -> Result<Self, IndexError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn, dimension)
    }

    /// Open an in-memory index (for tests and ephemeral pipelines).
    ///
    /// # Errors
    /// Returns [`IndexError::DuckDb`] if schema creation fails.
    pub fn open_in_memory(dimension: usize) -> Result<Self, IndexError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, dimension)
    }

    fn from_connection(conn: Connection, dimension: usize) -> Result<Self, IndexError> {
        conn.execute_batch(schema::CREATE_REFERENCE_EXAMPLES)?;
        conn.execute_batch(schema::CREATE_INDEX_META)?;

        let mut index = Self { conn, dimension };
        match index.get_meta(schema::DIMENSION_KEY) {
            Ok(value) => {
                let recorded: usize = serde_json::from_str(&value)
                    .map_err(|e| IndexError::Corrupt(format!("bad dimension record: {e}")))?;
                if recorded != dimension {
                    return Err(IndexError::Corrupt(format!(
                        "index was created with dimension {recorded}, opened with {dimension}"
                    )));
                }
            }
            Err(IndexError::MetaNotFound(_)) => {
                index.put_meta(schema::DIMENSION_KEY, &dimension.to_string())?;
            }
            Err(other) => return Err(other),
        }
        Ok(index)
    }

    /// Fixed embedding dimension this index was created with.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Distinct lens names derived from stored reference examples.
    ///
    /// # Errors
    /// Returns [`IndexError::DuckDb`] if the query fails.
    pub fn list_lenses(&self) -> Result<Vec<String>, IndexError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT lens_name FROM reference_examples ORDER BY lens_name")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }
}

/// Filter selecting which (lens, pole) bucket a `top_k` query searches.
#[derive(Debug, Clone)]
pub struct PoleFilter<'a> {
    pub lens_name: &'a str,
    pub pole: Pole,
}
