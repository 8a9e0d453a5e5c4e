//! # lens-baker
//!
//! Offline calibration pass (spec §4.4): parses the reference corpus,
//! embeds every example, writes it into the Vector Index, equalizes
//! separation power across lenses via fixed-point iteration, and
//! persists the resulting correction factors as calibration metadata.

mod fixedpoint;
mod separation;

pub mod error;
pub use error::CalibrationError;
pub use fixedpoint::{CalibrationOutcome, LensExamples, EPSILON, MAX_ITERATIONS};
pub use separation::{lens_seed, separation_power, OPPOSING_SAMPLE_CAP};

use std::collections::BTreeMap;

use lens_core::{CalibrationMetadata, Pole, ReferenceExample};
use lens_corpus::CorpusWarning;
use lens_embeddings::EmbeddingProvider;
use lens_index::Index;

/// Minimum examples a pole must have to avoid `low_confidence`.
pub const MIN_EXAMPLES_FOR_CONFIDENCE: usize = 5;

/// Calibration metadata format version written by this baker.
const METADATA_VERSION: u32 = 1;

/// Per-bake overridable calibration parameters (spec §9: thresholds are
/// instance-level configuration, not process-wide singletons).
#[derive(Debug, Clone, Copy)]
pub struct BakerConfig {
    /// Fixed-point convergence tolerance `ε` (spec §4.4 step 5).
    pub calibration_epsilon: f32,
    /// Hard iteration cap (spec §4.4 step 5).
    pub calibration_max_iterations: u32,
    /// Minimum examples a pole must have to avoid `low_confidence`.
    pub min_examples_for_confidence: usize,
}

impl Default for BakerConfig {
    fn default() -> Self {
        Self {
            calibration_epsilon: EPSILON,
            calibration_max_iterations: MAX_ITERATIONS,
            min_examples_for_confidence: MIN_EXAMPLES_FOR_CONFIDENCE,
        }
    }
}

/// Non-fatal issue surfaced during a bake.
#[derive(Debug, Clone, PartialEq)]
pub enum BakeWarning {
    /// Forwarded from corpus parsing: a lens had no examples in one pole
    /// and was excluded entirely.
    LensUnderpopulated { lens_name: String, pole: Pole },
    /// A lens baked successfully but one of its poles had fewer than
    /// [`MIN_EXAMPLES_FOR_CONFIDENCE`] examples.
    LensLowConfidence { lens_name: String },
    /// The fixed-point loop did not converge within [`MAX_ITERATIONS`].
    CalibrationStalled,
}

/// Structured summary of a bake, returned alongside the persisted index
/// metadata so a caller (CLI or test) can assert on outcomes without
/// parsing log output.
#[derive(Debug, Clone)]
pub struct BakeReport {
    pub per_lens_factors: BTreeMap<String, (f32, f32)>,
    pub separation_powers: BTreeMap<String, f32>,
    pub iteration_count: u32,
    pub stalled: bool,
    pub low_confidence_lenses: Vec<String>,
    pub warnings: Vec<BakeWarning>,
}

/// Run a full bake: parse `corpus_text`, embed every example with
/// `embedder`, write records into `index`, calibrate, and persist the
/// resulting calibration metadata.
///
/// # Errors
/// Returns [`CalibrationError::Corpus`] on a hard parse failure,
/// [`CalibrationError::Embedding`] if the provider fails,
/// [`CalibrationError::Index`] if the index write/persist fails, or
/// [`CalibrationError::NoLenses`] if every lens was excluded as
/// underpopulated.
pub fn bake<E: EmbeddingProvider>(
    corpus_text: &str,
    embedder: &E,
    index: &Index,
    config: BakerConfig,
) -> Result<BakeReport, CalibrationError> {
    let parsed = lens_corpus::parse(corpus_text)?;

    let mut warnings: Vec<BakeWarning> = parsed
        .warnings
        .into_iter()
        .map(|w| match w {
            CorpusWarning::LensUnderpopulated { lens_name, pole } => {
                BakeWarning::LensUnderpopulated { lens_name, pole }
            }
        })
        .collect();

    if parsed.groups.is_empty() {
        return Err(CalibrationError::NoLenses);
    }

    // Flatten every example text in document order so embedding happens
    // in a single batch call, then fan the resulting vectors back out by
    // position.
    let flat_texts: Vec<String> = parsed
        .groups
        .iter()
        .flat_map(|g| g.examples.iter().cloned())
        .collect();

    let embeddings = embedder.embed_batch(&flat_texts)?;

    let mut lens_examples: BTreeMap<String, LensExamples> = BTreeMap::new();
    let mut records: Vec<ReferenceExample> = Vec::with_capacity(flat_texts.len());

    for ((group, text), embedding) in parsed
        .groups
        .iter()
        .flat_map(|g| g.examples.iter().map(move |t| (g, t)))
        .zip(embeddings.into_iter())
    {
        let id = lens_core::content_id(text);
        records.push(ReferenceExample {
            id,
            lens_name: group.lens_name.clone(),
            pole: group.pole,
            text: text.clone(),
            embedding: embedding.clone(),
        });

        let entry = lens_examples.entry(group.lens_name.clone()).or_default();
        match group.pole {
            Pole::Positive => entry.positives.push(embedding),
            Pole::Negative => entry.negatives.push(embedding),
        }
    }

    index.write(&records)?;

    let mut low_confidence_lenses = Vec::new();
    for (name, examples) in &lens_examples {
        if examples.positives.len() < config.min_examples_for_confidence
            || examples.negatives.len() < config.min_examples_for_confidence
        {
            low_confidence_lenses.push(name.clone());
            warnings.push(BakeWarning::LensLowConfidence {
                lens_name: name.clone(),
            });
        }
    }

    let outcome = fixedpoint::iterate(
        &lens_examples,
        config.calibration_epsilon,
        config.calibration_max_iterations,
    );
    if outcome.stalled {
        warnings.push(BakeWarning::CalibrationStalled);
        tracing::warn!(
            iterations = outcome.iteration_count,
            "calibration did not converge within the iteration cap; persisting best-effort factors"
        );
    }

    let metadata = CalibrationMetadata {
        version: METADATA_VERSION,
        embedding_model_id: embedder.model_id().to_string(),
        dimension: embedder.dimension(),
        per_lens_factors: outcome.factors.clone(),
        separation_powers: outcome.separation_powers.clone(),
        iteration_count: outcome.iteration_count,
        stalled: outcome.stalled,
    };
    index.put_calibration(&metadata)?;

    tracing::info!(
        lenses = lens_examples.len(),
        iterations = outcome.iteration_count,
        stalled = outcome.stalled,
        "bake complete"
    );

    Ok(BakeReport {
        per_lens_factors: outcome.factors,
        separation_powers: outcome.separation_powers,
        iteration_count: outcome.iteration_count,
        stalled: outcome.stalled,
        low_confidence_lenses,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_embeddings::EmbeddingError;

    /// A deterministic, non-ML embedder for tests: embeds a line by
    /// hashing it into a small fixed-dimension vector via byte sums, so
    /// bake logic can be exercised without a real model.
    struct FakeEmbedder;

    impl EmbeddingProvider for FakeEmbedder {
        fn model_id(&self) -> &str {
            "fake/test-embedder"
        }

        fn dimension(&self) -> usize {
            2
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(self.embed_batch(std::slice::from_ref(&text.to_string()))?
                .remove(0))
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts
                .iter()
                .map(|t| {
                    // "ship"/"win"-flavored text -> near (1,0); everything
                    // else -> near (0,1). Deterministic and good enough to
                    // exercise the bake pipeline end to end.
                    if t.to_ascii_lowercase().contains("ship")
                        || t.to_ascii_lowercase().contains("win")
                    {
                        vec![0.98, 0.2]
                    } else {
                        vec![0.2, 0.98]
                    }
                })
                .collect())
        }
    }

    const CORPUS: &str = "\
## Red

### POSITIVE
Ship it, we will win.
We will ship this today.
Shipping confidently, we win.
Another ship-it line of confidence.
Winning is what we do here.

### NEGATIVE
Nothing works and we are lost.
This is hopeless and broken.
We cannot ship anything at all.
Everything about this has failed.
There is no way we win this.
";

    #[test]
    fn bake_populates_index_and_metadata() {
        let index = Index::open_in_memory(2).unwrap();
        let report = bake(CORPUS, &FakeEmbedder, &index, BakerConfig::default()).unwrap();

        assert_eq!(index.list_lenses().unwrap(), vec!["red".to_string()]);
        assert!(report.per_lens_factors.contains_key("red"));

        let calibration = index.get_calibration().unwrap();
        assert_eq!(calibration.embedding_model_id, "fake/test-embedder");
        assert_eq!(calibration.dimension, 2);
    }

    #[test]
    fn bake_fails_when_every_lens_is_underpopulated() {
        let index = Index::open_in_memory(2).unwrap();
        let corpus = "## Red\n### POSITIVE\nonly one example\n";
        let err = bake(corpus, &FakeEmbedder, &index, BakerConfig::default()).unwrap_err();
        assert!(matches!(err, CalibrationError::NoLenses));
    }

    #[test]
    fn bake_marks_low_confidence_when_a_pole_has_few_examples() {
        let index = Index::open_in_memory(2).unwrap();
        let corpus = "\
## Red
### POSITIVE
Ship it, we will win.

### NEGATIVE
Nothing works and we are lost.
";
        let report = bake(corpus, &FakeEmbedder, &index, BakerConfig::default()).unwrap();
        assert!(report.low_confidence_lenses.contains(&"red".to_string()));
        assert!(report
            .warnings
            .iter()
            .any(|w| matches!(w, BakeWarning::LensLowConfidence { lens_name } if lens_name == "red")));
    }
}
