//! Top-k cosine similarity search over a `(lens, pole)` bucket.

use duckdb::params;

use crate::{Index, IndexError, PoleFilter};
use crate::write::vec_to_sql;

/// A single top-k search result.
#[derive(Debug, Clone, PartialEq)]
pub struct TopKHit {
    pub id: String,
    pub cosine: f32,
}

impl Index {
    /// Return the `k` reference examples in `filter`'s `(lens, pole)`
    /// bucket with highest cosine similarity to `vector`.
    ///
    /// Ties are broken by ascending `id` (lexicographic) so that results
    /// are fully deterministic regardless of `DuckDB`'s internal row
    /// order.
    ///
    /// # Errors
    /// Returns [`IndexError::Corrupt`] if `vector`'s length does not
    /// match the index's fixed dimension, or [`IndexError::DuckDb`] if
    /// the query fails.
    pub fn top_k(
        &self,
        vector: &[f32],
        k: usize,
        filter: PoleFilter<'_>,
    ) -> Result<Vec<TopKHit>, IndexError> {
        if vector.len() != self.dimension {
            return Err(IndexError::Corrupt(format!(
                "query vector has dimension {}, index expects {}",
                vector.len(),
                self.dimension
            )));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let dim = self.dimension;
        let query_vec = vec_to_sql(vector);
        let sql = format!(
            "SELECT id, array_cosine_similarity(
                 embedding::FLOAT[{dim}], ?::FLOAT[{dim}]
             ) AS cosine
             FROM reference_examples
             WHERE lens_name = ? AND pole = ?
             ORDER BY cosine DESC, id ASC
             LIMIT ?"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![query_vec, filter.lens_name, filter.pole.as_str(), k as i64],
            |row| {
                Ok(TopKHit {
                    id: row.get(0)?,
                    cosine: row.get(1)?,
                })
            },
        )?;

        let mut hits = Vec::new();
        for row in rows {
            hits.push(row?);
        }
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_core::{Pole, ReferenceExample};

    fn example(id: &str, lens: &str, pole: Pole, embedding: Vec<f32>) -> ReferenceExample {
        ReferenceExample {
            id: id.to_string(),
            lens_name: lens.to_string(),
            pole,
            text: id.to_string(),
            embedding,
        }
    }

    #[test]
    fn top_k_orders_by_descending_cosine() {
        let index = Index::open_in_memory(2).unwrap();
        index
            .write(&[
                example("a", "red", Pole::Positive, vec![1.0, 0.0]),
                example("b", "red", Pole::Positive, vec![0.0, 1.0]),
                example("c", "red", Pole::Positive, vec![0.9, 0.1]),
            ])
            .unwrap();

        let hits = index
            .top_k(
                &[1.0, 0.0],
                3,
                PoleFilter {
                    lens_name: "red",
                    pole: Pole::Positive,
                },
            )
            .unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[1].id, "c");
        assert_eq!(hits[2].id, "b");
    }

    #[test]
    fn top_k_respects_pole_filter() {
        let index = Index::open_in_memory(2).unwrap();
        index
            .write(&[
                example("a", "red", Pole::Positive, vec![1.0, 0.0]),
                example("b", "red", Pole::Negative, vec![1.0, 0.0]),
            ])
            .unwrap();

        let hits = index
            .top_k(
                &[1.0, 0.0],
                5,
                PoleFilter {
                    lens_name: "red",
                    pole: Pole::Negative,
                },
            )
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "b");
    }

    #[test]
    fn top_k_rejects_mismatched_dimension() {
        let index = Index::open_in_memory(3).unwrap();
        let err = index.top_k(
            &[1.0, 0.0],
            1,
            PoleFilter {
                lens_name: "red",
                pole: Pole::Positive,
            },
        );
        assert!(matches!(err, Err(IndexError::Corrupt(_))));
    }

    #[test]
    fn top_k_zero_returns_empty() {
        let index = Index::open_in_memory(2).unwrap();
        let hits = index
            .top_k(
                &[1.0, 0.0],
                0,
                PoleFilter {
                    lens_name: "red",
                    pole: Pole::Positive,
                },
            )
            .unwrap();
        assert!(hits.is_empty());
    }
}
