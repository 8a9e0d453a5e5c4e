//! Key-value metadata access (`get_meta` / `put_meta`), including the
//! `__calibration__` record.

use duckdb::params;

use crate::{Index, IndexError};

impl Index {
    /// Fetch a raw JSON-encoded metadata value by key.
    ///
    /// # Errors
    /// Returns [`IndexError::MetaNotFound`] if the key does not exist, or
    /// [`IndexError::DuckDb`] on a query failure.
    pub fn get_meta(&self, key: &str) -> Result<String, IndexError> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM index_meta WHERE key = ?")?;
        let value: Option<String> = stmt
            .query_row(params![key], |row| row.get(0))
            .ok();
        value.ok_or_else(|| IndexError::MetaNotFound(key.to_string()))
    }

    /// Write a raw JSON-encoded metadata value, overwriting any prior
    /// value for the same key.
    ///
    /// # Errors
    /// Returns [`IndexError::DuckDb`] if the write fails.
    pub fn put_meta(&self, key: &str, value: &str) -> Result<(), IndexError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO index_meta (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Fetch and deserialize the calibration metadata record, if present.
    ///
    /// # Errors
    /// Returns [`IndexError::MetaNotFound`] if no bake has happened yet,
    /// or [`IndexError::Corrupt`] if the stored JSON is malformed.
    pub fn get_calibration(
        &self,
    ) -> Result<lens_core::CalibrationMetadata, IndexError> {
        let raw = self.get_meta(lens_core::CalibrationMetadata::KEY)?;
        serde_json::from_str(&raw)
            .map_err(|e| IndexError::Corrupt(format!("bad calibration record: {e}")))
    }

    /// Persist the calibration metadata record.
    ///
    /// # Errors
    /// Returns [`IndexError::DuckDb`] if the write fails.
    pub fn put_calibration(
        &self,
        calibration: &lens_core::CalibrationMetadata,
    ) -> Result<(), IndexError> {
        let raw = serde_json::to_string(calibration)
            .map_err(|e| IndexError::Corrupt(format!("failed to serialize calibration: {e}")))?;
        self.put_meta(lens_core::CalibrationMetadata::KEY, &raw)
    }
}
