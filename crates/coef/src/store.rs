//! Content-addressable blob store (spec §4.6).
//!
//! Backed by `DuckDB`, matching the Vector Index's storage choice so the
//! workspace does not carry two database engines for two components
//! that both just need key-value persistence plus occasional bulk scan.

use duckdb::{params, Connection};

use crate::error::CoefError;

const CREATE_BLOBS: &str = "
CREATE TABLE IF NOT EXISTS blobs (
    hash TEXT NOT NULL,
    bytes BLOB NOT NULL,
    PRIMARY KEY (hash)
);
";

/// A content-addressable, immutable blob store.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a file-backed store at `path`.
    ///
    /// # Errors
    /// Returns [`CoefError::DuckDb`] if the file cannot be opened or the
    /// schema cannot be created.
    pub fn open(path: &str) -> Result<Self, CoefError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(CREATE_BLOBS)?;
        Ok(Self { conn })
    }

    /// Open an in-memory store (for tests and single-process pipelines).
    ///
    /// # Errors
    /// Returns [`CoefError::DuckDb`] if schema creation fails.
    pub fn open_in_memory() -> Result<Self, CoefError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CREATE_BLOBS)?;
        Ok(Self { conn })
    }

    /// Write `bytes` to the store, returning its content hash.
    ///
    /// Idempotent: writing the same bytes twice leaves the store in the
    /// same state as writing them once.
    ///
    /// # Errors
    /// Returns [`CoefError::DuckDb`] if the write fails.
    pub fn put(&self, bytes: &[u8]) -> Result<String, CoefError> {
        let hash = lens_core::sha256_hex(bytes);
        self.conn.execute(
            "INSERT OR REPLACE INTO blobs (hash, bytes) VALUES (?, ?)",
            params![hash, bytes],
        )?;
        Ok(hash)
    }

    /// Fetch the bytes stored under `hash`.
    ///
    /// # Errors
    /// Returns [`CoefError::ContentMissing`] if no blob has that hash, or
    /// [`CoefError::DuckDb`] on a query failure.
    pub fn get(&self, hash: &str) -> Result<Vec<u8>, CoefError> {
        let mut stmt = self.conn.prepare("SELECT bytes FROM blobs WHERE hash = ?")?;
        let bytes: Option<Vec<u8>> = stmt.query_row(params![hash], |row| row.get(0)).ok();
        bytes.ok_or_else(|| CoefError::ContentMissing(hash.to_string()))
    }

    /// Whether a blob with `hash` exists.
    ///
    /// # Errors
    /// Returns [`CoefError::DuckDb`] on a query failure.
    pub fn exists(&self, hash: &str) -> Result<bool, CoefError> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM blobs WHERE hash = ? LIMIT 1")?;
        let found: Option<i64> = stmt.query_row(params![hash], |row| row.get(0)).ok();
        Ok(found.is_some())
    }

    /// All stored hashes, in unspecified order.
    ///
    /// # Errors
    /// Returns [`CoefError::DuckDb`] on a query failure.
    pub fn list(&self) -> Result<Vec<String>, CoefError> {
        let mut stmt = self.conn.prepare("SELECT hash FROM blobs")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut hashes = Vec::new();
        for row in rows {
            hashes.push(row?);
        }
        Ok(hashes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn put_then_get_roundtrips_bitwise() {
        let store = Store::open_in_memory().unwrap();
        let hash = store.put(b"hello").unwrap();
        assert_eq!(store.get(&hash).unwrap(), b"hello");
    }

    #[test]
    fn put_hash_matches_sha256() {
        let store = Store::open_in_memory().unwrap();
        let hash = store.put(b"hello").unwrap();
        assert_eq!(hash, lens_core::sha256_hex(b"hello"));
    }

    #[test]
    fn put_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        let h1 = store.put(b"same bytes").unwrap();
        let h2 = store.put(b"same bytes").unwrap();
        assert_eq!(h1, h2);
        assert_eq!(store.list().unwrap(), vec![h1]);
    }

    #[test]
    fn missing_hash_is_reported() {
        let store = Store::open_in_memory().unwrap();
        assert!(!store.exists("deadbeef").unwrap());
        assert!(matches!(
            store.get("deadbeef"),
            Err(CoefError::ContentMissing(_))
        ));
    }

    #[test]
    fn distinct_bytes_produce_distinct_entries() {
        let store = Store::open_in_memory().unwrap();
        store.put(b"a").unwrap();
        store.put(b"b").unwrap();
        assert_eq!(store.list().unwrap().len(), 2);
    }
}
