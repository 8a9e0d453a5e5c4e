//! End-to-end bake-then-scan integration tests.
//!
//! These exercise the full pipeline across crate boundaries: reference
//! corpus -> bake (embed + write + calibrate) -> scan a document against
//! the resulting index. Unit tests within each crate cover the pieces in
//! isolation; this file covers the seams between `lens-baker` and
//! `lens-scanner` that neither crate alone can validate.

use std::collections::BTreeMap;

use lens_embeddings::{EmbeddingError, EmbeddingProvider};
use lens_index::Index;
use lens_scanner::Scanner;

/// A small deterministic embedder: buckets text into one of a handful of
/// fixed unit vectors based on keyword presence. Good enough to drive a
/// real bake + scan pipeline without depending on a downloaded model.
struct KeywordEmbedder {
    dimension: usize,
}

impl KeywordEmbedder {
    fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let lower = text.to_ascii_lowercase();
        let mut v = vec![0.0f32; self.dimension];
        if lower.contains("ship") || lower.contains("believe") || lower.contains("win") {
            v[0] = 1.0;
        } else if lower.contains("hopeless")
            || lower.contains("give up")
            || lower.contains("doomed")
            || lower.contains("failed")
        {
            v[1] = 1.0;
        } else if lower.contains("calm") || lower.contains("measured") || lower.contains("steady")
        {
            v[2 % self.dimension] = 1.0;
        } else if lower.contains("chaotic") || lower.contains("frantic") || lower.contains("erratic")
        {
            v[3 % self.dimension] = 1.0;
        } else {
            // Neutral text lands on a fifth axis so it doesn't spuriously
            // resemble any lens's poles.
            v[4 % self.dimension] = 1.0;
        }
        v
    }
}

impl EmbeddingProvider for KeywordEmbedder {
    fn model_id(&self) -> &str {
        "test/keyword-embedder"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.vector_for(text))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }
}

const CORPUS: &str = "\
## Red

### POSITIVE
Ship it, we will win this together.
We believe in this plan and we will ship it.
Winning starts with believing we can ship.
Every line of code here is shipped with confidence.
We will win by shipping early and often.

### NEGATIVE
This is hopeless and we should give up.
Nothing here will ever ship, it is doomed.
We have failed and there is no way forward.
Give up now, this effort is hopeless.
Doomed from the start, nothing here worked.

## Blue

### POSITIVE
A calm and measured plan guides our steady progress.
Steady hands keep this calm and measured effort on track.
We move forward in a calm, measured, and steady way.
This is a calm plan executed in a measured, steady manner.
A steady and measured approach keeps everything calm.

### NEGATIVE
Everything here feels chaotic and frantic beyond control.
A chaotic, erratic mess of frantic last-minute changes.
This frantic and chaotic scramble is completely erratic.
Erratic decisions made in a chaotic, frantic rush.
Chaotic and frantic, the whole plan feels erratic.
";

#[test]
fn baseline_sanity_red_dominates_its_own_lens() {
    let embedder = KeywordEmbedder::new(8);
    let index = Index::open_in_memory(embedder.dimension()).unwrap();
    let report = lens_baker::bake(CORPUS, &embedder, &index, lens_baker::BakerConfig::default()).unwrap();
    assert!(!report.stalled || report.iteration_count > 0);

    let scanner = Scanner::default();
    let doc = "Ship it. I believe in this, and we will win this together for sure.";
    let reading = scanner.scan(doc, &index, &embedder, None, None).unwrap();

    assert_eq!(reading.lines_scanned, 1);
    let red = reading.aggregates.get("red").unwrap();
    let blue = reading.aggregates.get("blue").unwrap();
    assert!(
        red.pos_mean > red.neg_mean + 0.5,
        "expected red positive pole to dominate, got {red:?}"
    );
    assert!(
        (blue.pos_mean - blue.neg_mean).abs() < 2.0,
        "expected blue to stay roughly neutral on unrelated text, got {blue:?}"
    );
}

#[test]
fn scan_is_deterministic_across_repeated_runs() {
    let embedder = KeywordEmbedder::new(8);
    let index = Index::open_in_memory(embedder.dimension()).unwrap();
    lens_baker::bake(CORPUS, &embedder, &index, lens_baker::BakerConfig::default()).unwrap();

    let scanner = Scanner::default();
    let doc = "\
Ship it, I believe in this plan, and we will win this together.
A calm and measured approach keeps everything steady here.
Everything here feels chaotic, frantic, and completely erratic.
This is hopeless and we should give up on all of it.
";

    let first = scanner.scan(doc, &index, &embedder, None, None).unwrap();
    let second = scanner.scan(doc, &index, &embedder, None, None).unwrap();

    assert_eq!(first.lines_scanned, second.lines_scanned);
    for (name, agg) in &first.aggregates {
        let other = second.aggregates.get(name).unwrap();
        assert!((agg.pos_mean - other.pos_mean).abs() < 1e-6);
        assert!((agg.neg_mean - other.neg_mean).abs() < 1e-6);
    }
}

#[test]
fn line_indices_are_strictly_increasing_and_within_range() {
    let embedder = KeywordEmbedder::new(8);
    let index = Index::open_in_memory(embedder.dimension()).unwrap();
    lens_baker::bake(CORPUS, &embedder, &index, lens_baker::BakerConfig::default()).unwrap();

    let scanner = Scanner::default();
    let doc = "\
# A heading that is skipped entirely from scanning
Ship it, I believe in this plan, and we will win this together for sure.
- a bullet point long enough to pass the length gate but still skipped
A calm and measured approach keeps everything steady and on track here.
";

    let reading = scanner.scan(doc, &index, &embedder, None, None).unwrap();
    let indices: Vec<usize> = reading.lines.iter().map(|l| l.index).collect();
    let mut sorted = indices.clone();
    sorted.sort_unstable();
    assert_eq!(indices, sorted, "line indices must preserve source order");
    assert!(indices.windows(2).all(|w| w[0] < w[1]));
    assert!(indices.iter().all(|&i| (1..=doc.lines().count()).contains(&i)));
}

#[test]
fn accelerators_scale_scores_after_calibration() {
    let embedder = KeywordEmbedder::new(8);
    let index = Index::open_in_memory(embedder.dimension()).unwrap();
    lens_baker::bake(CORPUS, &embedder, &index, lens_baker::BakerConfig::default()).unwrap();

    let scanner = Scanner::default();
    let doc = "Ship it, I believe in this plan, and we will win this together for sure.";

    let baseline = scanner.scan(doc, &index, &embedder, None, None).unwrap();

    let mut accelerators: BTreeMap<String, (f32, f32)> = BTreeMap::new();
    accelerators.insert("red".to_string(), (2.0, 1.0));
    let boosted = scanner
        .scan(doc, &index, &embedder, Some(&accelerators), None)
        .unwrap();

    let base_red = baseline.aggregates.get("red").unwrap();
    let boosted_red = boosted.aggregates.get("red").unwrap();
    assert!(boosted_red.pos_mean >= base_red.pos_mean);
}
