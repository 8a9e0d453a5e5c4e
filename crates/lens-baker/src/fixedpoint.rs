//! Fixed-point separation-power equalization (spec §4.4, algorithm steps
//! 1-6).

use std::collections::BTreeMap;

use crate::separation::{lens_seed, separation_power};

/// Convergence tolerance on `max_L |s[L] - s*|`.
pub const EPSILON: f32 = 0.01;
/// Hard iteration cap; calibration is marked `stalled` if reached.
pub const MAX_ITERATIONS: u32 = 20;
/// Per-iteration clamp on the `s* / s[L]` scaling ratio.
const STEP_CLAMP: (f32, f32) = (0.5, 2.0);

/// The embeddings of a single lens's reference examples, grouped by pole.
#[derive(Debug, Clone, Default)]
pub struct LensExamples {
    pub positives: Vec<Vec<f32>>,
    pub negatives: Vec<Vec<f32>>,
}

/// Result of running the fixed-point calibration loop.
#[derive(Debug, Clone)]
pub struct CalibrationOutcome {
    /// `(positive_factor, negative_factor)` per lens.
    pub factors: BTreeMap<String, (f32, f32)>,
    /// Separation power snapshot from the last iteration run.
    pub separation_powers: BTreeMap<String, f32>,
    pub iteration_count: u32,
    pub stalled: bool,
}

/// Run the fixed-point calibration loop over the given lenses' example
/// embeddings.
///
/// Only the positive-pole correction factor is scaled each iteration,
/// per the literal algorithm text in spec §4.4 step 4 ("scale
/// `c[L][pos]`"); the negative factor remains `1.0`.
///
/// `epsilon` and `max_iterations` are the per-instance overrides of
/// [`EPSILON`]/[`MAX_ITERATIONS`] (spec §9: no process-wide singletons —
/// a caller's [`crate::BakerConfig`] supplies these).
#[must_use]
pub fn iterate(
    lenses: &BTreeMap<String, LensExamples>,
    epsilon: f32,
    max_iterations: u32,
) -> CalibrationOutcome {
    let mut pos_factor: BTreeMap<String, f32> =
        lenses.keys().map(|name| (name.clone(), 1.0)).collect();
    let neg_factor: BTreeMap<String, f32> =
        lenses.keys().map(|name| (name.clone(), 1.0)).collect();

    let mut last_powers: BTreeMap<String, f32> = BTreeMap::new();
    let mut iteration_count = 0u32;
    let mut stalled = true;

    for iteration in 0..max_iterations {
        iteration_count = iteration + 1;

        let mut powers = BTreeMap::new();
        for (name, examples) in lenses {
            let seed = lens_seed(name);
            let power = separation_power(
                &examples.positives,
                &examples.negatives,
                pos_factor[name],
                neg_factor[name],
                seed,
            );
            powers.insert(name.clone(), power);
        }

        let target = if powers.is_empty() {
            0.0
        } else {
            powers.values().sum::<f32>() / powers.len() as f32
        };
        let max_deviation = powers
            .values()
            .map(|power| (power - target).abs())
            .fold(0.0f32, f32::max);

        last_powers = powers.clone();

        if max_deviation < epsilon {
            stalled = false;
            break;
        }

        for (name, power) in &powers {
            if power.abs() < f32::EPSILON {
                continue;
            }
            let ratio = (target / power).clamp(STEP_CLAMP.0, STEP_CLAMP.1);
            if let Some(factor) = pos_factor.get_mut(name) {
                *factor *= ratio;
            }
        }
    }

    let factors = lenses
        .keys()
        .map(|name| (name.clone(), (pos_factor[name], neg_factor[name])))
        .collect();

    CalibrationOutcome {
        factors,
        separation_powers: last_powers,
        iteration_count,
        stalled,
    }
}
