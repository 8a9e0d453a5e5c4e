//! Scanner and Baker numeric parameters (spec §9: thresholds are
//! instance-level configuration, not process-wide singletons — this
//! struct only supplies the *defaults* an instance is constructed with
//! when a caller doesn't override them explicitly).

use serde::{Deserialize, Serialize};

const fn default_score_floor() -> f32 {
    0.03
}

const fn default_tau_convergence() -> f32 {
    0.35
}

const fn default_tau_tension() -> f32 {
    0.4
}

const fn default_top_k() -> u32 {
    5
}

const fn default_calibration_epsilon() -> f32 {
    0.01
}

const fn default_calibration_max_iterations() -> u32 {
    20
}

const fn default_min_examples_for_confidence() -> u32 {
    5
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ThresholdsConfig {
    /// Scanner: net-score floor below which a per-lens net is clamped to 0.
    #[serde(default = "default_score_floor")]
    pub score_floor: f32,

    /// Scanner: convergence threshold (spec §4.5 step 6).
    #[serde(default = "default_tau_convergence")]
    pub tau_convergence: f32,

    /// Scanner: tension threshold (spec §4.5 step 6).
    #[serde(default = "default_tau_tension")]
    pub tau_tension: f32,

    /// Scanner: `top_k` depth used to derive the per-(lens, pole) max cosine.
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Baker: fixed-point convergence tolerance `ε` (spec §4.4 step 5).
    #[serde(default = "default_calibration_epsilon")]
    pub calibration_epsilon: f32,

    /// Baker: hard iteration cap (spec §4.4 step 5).
    #[serde(default = "default_calibration_max_iterations")]
    pub calibration_max_iterations: u32,

    /// Baker: minimum examples per pole before a lens is `low_confidence`.
    #[serde(default = "default_min_examples_for_confidence")]
    pub min_examples_for_confidence: u32,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            score_floor: default_score_floor(),
            tau_convergence: default_tau_convergence(),
            tau_tension: default_tau_tension(),
            top_k: default_top_k(),
            calibration_epsilon: default_calibration_epsilon(),
            calibration_max_iterations: default_calibration_max_iterations(),
            min_examples_for_confidence: default_min_examples_for_confidence(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_values_named_in_the_spec() {
        let config = ThresholdsConfig::default();
        assert!((config.score_floor - 0.03).abs() < f32::EPSILON);
        assert!((config.tau_convergence - 0.35).abs() < f32::EPSILON);
        assert!((config.tau_tension - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.top_k, 5);
        assert!((config.calibration_epsilon - 0.01).abs() < f32::EPSILON);
        assert_eq!(config.calibration_max_iterations, 20);
        assert_eq!(config.min_examples_for_confidence, 5);
    }
}
