//! Bulk upsert of reference examples.

use duckdb::params;

use crate::{Index, IndexError};
use lens_core::ReferenceExample;

/// Format a `Vec<f32>` as a `DuckDB` array literal: `[0.1, 0.2, ...]`.
pub(crate) fn vec_to_sql(v: &[f32]) -> String {
    use std::fmt::Write;
    let mut s = String::with_capacity(v.len() * 10 + 2);
    s.push('[');
    for (i, x) in v.iter().enumerate() {
        if i > 0 {
            s.push_str(", ");
        }
        let _ = write!(s, "{x}");
    }
    s.push(']');
    s
}

impl Index {
    /// Upsert reference examples by `id`.
    ///
    /// Records with the same `id` are expected to carry byte-identical
    /// `text` (identity invariant, spec §4.3); a duplicate write with the
    /// same content is a no-op in effect (idempotent).
    ///
    /// # Errors
    /// Returns [`IndexError::Corrupt`] if an embedding's length doesn't
    /// match the index's fixed dimension, or [`IndexError::DuckDb`] if
    /// the write fails.
    pub fn write(&self, records: &[ReferenceExample]) -> Result<(), IndexError> {
        for record in records {
            if record.embedding.len() != self.dimension {
                return Err(IndexError::Corrupt(format!(
                    "reference example {} has embedding dimension {}, index expects {}",
                    record.id,
                    record.embedding.len(),
                    self.dimension
                )));
            }
        }

        let mut stmt = self.conn.prepare(
            "INSERT OR REPLACE INTO reference_examples (id, lens_name, pole, text, embedding)
             VALUES (?, ?, ?, ?, ?::FLOAT[])",
        )?;
        for record in records {
            stmt.execute(params![
                record.id,
                record.lens_name,
                record.pole.as_str(),
                record.text,
                vec_to_sql(&record.embedding),
            ])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_core::Pole;

    fn example(id: &str, lens: &str, pole: Pole, text: &str, embedding: Vec<f32>) -> ReferenceExample {
        ReferenceExample {
            id: id.to_string(),
            lens_name: lens.to_string(),
            pole,
            text: text.to_string(),
            embedding,
        }
    }

    #[test]
    fn write_then_list_lenses_reflects_stored_records() {
        let index = Index::open_in_memory(2).unwrap();
        index
            .write(&[example("a", "red", Pole::Positive, "ship it", vec![1.0, 0.0])])
            .unwrap();
        assert_eq!(index.list_lenses().unwrap(), vec!["red".to_string()]);
    }

    #[test]
    fn write_is_idempotent_for_identical_records() {
        let index = Index::open_in_memory(2).unwrap();
        let rec = example("a", "red", Pole::Positive, "ship it", vec![1.0, 0.0]);
        index.write(&[rec.clone()]).unwrap();
        index.write(&[rec]).unwrap();
        assert_eq!(index.list_lenses().unwrap(), vec!["red".to_string()]);
    }

    #[test]
    fn write_rejects_wrong_dimension() {
        let index = Index::open_in_memory(3).unwrap();
        let rec = example("a", "red", Pole::Positive, "ship it", vec![1.0, 0.0]);
        assert!(matches!(index.write(&[rec]), Err(IndexError::Corrupt(_))));
    }
}
