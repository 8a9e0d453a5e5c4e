//! # lens-scanner
//!
//! Scores each scannable line of a document against every baked lens
//! and aggregates the result into a [`DocumentReading`] (spec §4.5).

mod cancel;
mod linefilter;

pub mod error;
pub use cancel::CancellationToken;
pub use error::ScanError;
pub use linefilter::{is_scannable_line, scannable_lines};

use std::collections::BTreeMap;

use lens_core::{Convergence, DocumentReading, LensAggregate, LineReading, Pole, Tension};
use lens_embeddings::EmbeddingProvider;
use lens_index::{Index, PoleFilter};

/// Per-(lens, pole) top-k depth used to derive the max-cosine score.
const TOP_K: usize = 5;
/// Net score floor (spec §4.5 step 4): rejects noise below this gap.
pub const SCORE_FLOOR: f32 = 0.03;
/// Convergence threshold: two or more lenses' net scores exceed this.
pub const TAU_CONVERGENCE: f32 = 0.35;
/// Tension threshold: exactly one lens dominates while another opposes.
pub const TAU_TENSION: f32 = 0.4;

/// Per-lens `(positive_multiplier, negative_multiplier)` overrides applied
/// after calibration (spec §4.5 step 2, resolved order per SPEC_FULL.md).
pub type AcceleratorSet = BTreeMap<String, (f32, f32)>;

/// Configurable scanner thresholds (spec §9: no process-wide singletons —
/// every instance carries its own parameters, defaulted but overridable).
#[derive(Debug, Clone, Copy)]
pub struct ScannerConfig {
    pub top_k: usize,
    pub score_floor: f32,
    pub tau_convergence: f32,
    pub tau_tension: f32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            top_k: TOP_K,
            score_floor: SCORE_FLOOR,
            tau_convergence: TAU_CONVERGENCE,
            tau_tension: TAU_TENSION,
        }
    }
}

/// Scores documents against a baked [`Index`] using an [`EmbeddingProvider`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Scanner {
    config: ScannerConfig,
}

impl Scanner {
    #[must_use]
    pub fn new(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// Scan `doc` against `index` using `embedder`, applying the baked
    /// calibration factors and any `accelerators` overrides.
    ///
    /// # Errors
    /// Returns [`ScanError::Index`] if calibration metadata cannot be
    /// read, [`ScanError::CalibrationModelMismatch`] if `embedder`'s
    /// model id does not match the index's baked model,
    /// [`ScanError::Embedding`] if embedding a line fails, or
    /// [`ScanError::Cancelled`] if `cancel` is set mid-scan.
    pub fn scan<E: EmbeddingProvider>(
        &self,
        doc: &str,
        index: &Index,
        embedder: &E,
        accelerators: Option<&AcceleratorSet>,
        cancel: Option<&CancellationToken>,
    ) -> Result<DocumentReading, ScanError> {
        let calibration = index.get_calibration()?;
        if calibration.embedding_model_id != embedder.model_id() {
            return Err(ScanError::CalibrationModelMismatch {
                baked: calibration.embedding_model_id,
                current: embedder.model_id().to_string(),
            });
        }

        let scannable = linefilter::scannable_lines(doc);
        if scannable.is_empty() {
            return Ok(DocumentReading::empty());
        }

        let texts: Vec<String> = scannable.iter().map(|(_, text)| text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts)?;

        let lens_names = index.list_lenses()?;

        let mut lines: Vec<LineReading> = Vec::with_capacity(scannable.len());
        let mut pos_sums: BTreeMap<String, f32> = lens_names.iter().map(|n| (n.clone(), 0.0)).collect();
        let mut neg_sums: BTreeMap<String, f32> = lens_names.iter().map(|n| (n.clone(), 0.0)).collect();
        let mut convergences = Vec::new();
        let mut tensions = Vec::new();

        for ((line_index, text), vector) in scannable.iter().zip(embeddings.iter()) {
            if let Some(token) = cancel {
                if token.is_cancelled() {
                    return Err(ScanError::Cancelled);
                }
            }

            let mut per_lens = BTreeMap::new();
            let mut nets: BTreeMap<String, f32> = BTreeMap::new();

            for lens_name in &lens_names {
                let (base_pos, base_neg) = calibration
                    .per_lens_factors
                    .get(lens_name)
                    .copied()
                    .unwrap_or((1.0, 1.0));
                let (accel_pos, accel_neg) = accelerators
                    .and_then(|set| set.get(lens_name))
                    .copied()
                    .unwrap_or((1.0, 1.0));

                let pos_max = max_cosine(index, vector, lens_name, Pole::Positive, self.config.top_k)?;
                let neg_max = max_cosine(index, vector, lens_name, Pole::Negative, self.config.top_k)?;

                let pos = base_pos * accel_pos * pos_max;
                let neg = base_neg * accel_neg * neg_max;

                *pos_sums.get_mut(lens_name).unwrap() += pos;
                *neg_sums.get_mut(lens_name).unwrap() += neg;

                let net = if pos - neg > self.config.score_floor {
                    pos - neg
                } else {
                    0.0
                };
                nets.insert(lens_name.clone(), net);

                per_lens.insert(lens_name.clone(), (pos, neg));
            }

            let converging: Vec<String> = nets
                .iter()
                .filter(|(_, net)| **net > self.config.tau_convergence)
                .map(|(name, _)| name.clone())
                .collect();
            if converging.len() >= 2 {
                convergences.push(Convergence {
                    line_index: *line_index,
                    lenses: converging,
                });
            }

            let dominant: Vec<&String> = nets
                .iter()
                .filter(|(_, net)| **net > self.config.tau_tension)
                .map(|(name, _)| name)
                .collect();
            if dominant.len() == 1 {
                let dominant_name = dominant[0];
                let opposing = per_lens.iter().find(|(name, (pos, neg))| {
                    *name != dominant_name && (neg - pos) > self.config.tau_tension
                });
                if let Some((opposing_name, _)) = opposing {
                    tensions.push(Tension {
                        line_index: *line_index,
                        dominant_lens: dominant_name.clone(),
                        opposing_lens: opposing_name.clone(),
                    });
                }
            }

            lines.push(LineReading {
                index: *line_index,
                text: text.clone(),
                per_lens,
            });
        }

        let line_count = lines.len() as f32;
        let aggregates = lens_names
            .into_iter()
            .map(|name| {
                let pos_mean = pos_sums.get(&name).copied().unwrap_or(0.0) / line_count;
                let neg_mean = neg_sums.get(&name).copied().unwrap_or(0.0) / line_count;
                (
                    name,
                    LensAggregate {
                        pos_mean: rescale(pos_mean),
                        neg_mean: rescale(neg_mean),
                    },
                )
            })
            .collect();

        Ok(DocumentReading {
            lines_scanned: lines.len(),
            aggregates,
            lines,
            convergences,
            tensions,
        })
    }
}

fn max_cosine(
    index: &Index,
    vector: &[f32],
    lens_name: &str,
    pole: Pole,
    top_k: usize,
) -> Result<f32, ScanError> {
    let hits = index.top_k(vector, top_k, PoleFilter { lens_name, pole })?;
    Ok(hits
        .into_iter()
        .map(|h| h.cosine)
        .fold(None, |acc, c| Some(acc.map_or(c, |m: f32| m.max(c))))
        .unwrap_or(0.0))
}

/// `s ↦ clamp(10 · s, 0, 10)` (spec §4.5 step 5).
fn rescale(s: f32) -> f32 {
    (10.0 * s).clamp(0.0, 10.0)
}
