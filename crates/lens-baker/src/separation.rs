//! Leave-one-out separation power scoring (spec §4.4).

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Maximum number of opposing-pole examples considered per scoring call.
/// Applied symmetrically to whichever pole plays the "opposing set" role,
/// since the leave-one-out score is computed the same way with poles
/// swapped.
pub const OPPOSING_SAMPLE_CAP: usize = 50;

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Deterministically sample up to `cap` indices out of `len`, seeded by
/// `seed`. Returns all indices in order if `len <= cap`.
pub fn sample_capped_indices(len: usize, cap: usize, seed: u64) -> Vec<usize> {
    if len <= cap {
        return (0..len).collect();
    }
    let mut indices: Vec<usize> = (0..len).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    indices.truncate(cap);
    indices.sort_unstable();
    indices
}

/// Derive a deterministic seed from a lens name, so sampling is
/// reproducible across bakes of the same corpus.
#[must_use]
pub fn lens_seed(lens_name: &str) -> u64 {
    let hex = lens_core::sha256_hex(lens_name.as_bytes());
    u64::from_str_radix(&hex[..16], 16).unwrap_or(0)
}

/// The corrected leave-one-out score for a single example: its own-pole
/// cohesion scaled by `own_factor`, minus its closeness to the opposing
/// pole scaled by `opposing_factor`.
fn corrected_score(
    embedding: &[f32],
    own_pool: &[&Vec<f32>],
    own_factor: f32,
    opposing_pool: &[&Vec<f32>],
    opposing_factor: f32,
) -> f32 {
    let own_max = own_pool
        .iter()
        .map(|o| dot(embedding, o))
        .fold(f32::MIN, f32::max);
    let own_max = if own_pool.is_empty() { 0.0 } else { own_max };

    let opposing_max = opposing_pool
        .iter()
        .map(|o| dot(embedding, o))
        .fold(f32::MIN, f32::max);
    let opposing_max = if opposing_pool.is_empty() {
        0.0
    } else {
        opposing_max
    };

    own_factor * own_max - opposing_factor * opposing_max
}

/// Mean leave-one-out separation power for a lens under the given
/// correction factors (spec §4.4).
#[must_use]
pub fn separation_power(
    positives: &[Vec<f32>],
    negatives: &[Vec<f32>],
    pos_factor: f32,
    neg_factor: f32,
    seed: u64,
) -> f32 {
    let mut scores = Vec::with_capacity(positives.len() + negatives.len());

    let sampled_neg_idx = sample_capped_indices(negatives.len(), OPPOSING_SAMPLE_CAP, seed);
    let sampled_neg: Vec<&Vec<f32>> = sampled_neg_idx.iter().map(|&i| &negatives[i]).collect();

    for (i, p) in positives.iter().enumerate() {
        let own_pool: Vec<&Vec<f32>> = positives
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, v)| v)
            .collect();
        scores.push(corrected_score(
            p,
            &own_pool,
            pos_factor,
            &sampled_neg,
            neg_factor,
        ));
    }

    let sampled_pos_idx =
        sample_capped_indices(positives.len(), OPPOSING_SAMPLE_CAP, seed.wrapping_add(1));
    let sampled_pos: Vec<&Vec<f32>> = sampled_pos_idx.iter().map(|&i| &positives[i]).collect();

    for (i, n) in negatives.iter().enumerate() {
        let own_pool: Vec<&Vec<f32>> = negatives
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, v)| v)
            .collect();
        scores.push(corrected_score(
            n,
            &own_pool,
            neg_factor,
            &sampled_pos,
            pos_factor,
        ));
    }

    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f32>() / scores.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sample_capped_indices_returns_all_when_under_cap() {
        assert_eq!(sample_capped_indices(3, 50, 7), vec![0, 1, 2]);
    }

    #[test]
    fn sample_capped_indices_is_deterministic() {
        let a = sample_capped_indices(200, 50, 42);
        let b = sample_capped_indices(200, 50, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
    }

    #[test]
    fn lens_seed_is_deterministic_per_name() {
        assert_eq!(lens_seed("red"), lens_seed("red"));
        assert_ne!(lens_seed("red"), lens_seed("blue"));
    }

    #[test]
    fn separation_power_is_high_for_well_separated_clusters() {
        let positives = vec![vec![1.0, 0.0], vec![0.9, 0.1]];
        let negatives = vec![vec![0.0, 1.0], vec![0.1, 0.9]];
        let power = separation_power(&positives, &negatives, 1.0, 1.0, 1);
        assert!(power > 0.5, "expected high separation, got {power}");
    }

    #[test]
    fn separation_power_is_low_for_overlapping_clusters() {
        let positives = vec![vec![1.0, 0.0], vec![0.9, 0.1]];
        let negatives = vec![vec![0.95, 0.05], vec![0.85, 0.15]];
        let power = separation_power(&positives, &negatives, 1.0, 1.0, 1);
        assert!(power < 0.3, "expected low separation, got {power}");
    }
}
