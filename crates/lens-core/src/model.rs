//! Shared data model: lenses, reference examples, calibration metadata,
//! and scan/document readings.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One direction of a lens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Pole {
    Positive,
    Negative,
}

impl Pole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for Pole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reference example: a short text exemplifying a (lens, pole) pair.
///
/// Identity is `sha256(text)[:16]` (see [`crate::identity::content_id`]).
/// Created at bake time; never mutated; removed only by rebake.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceExample {
    pub id: String,
    pub lens_name: String,
    pub pole: Pole,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A named semantic axis with positive and negative poles, trained from
/// reference examples.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Lens {
    pub name: String,
    /// Multiplicative correction applied to the positive pole's max cosine.
    pub positive_factor: f32,
    /// Multiplicative correction applied to the negative pole's max cosine.
    pub negative_factor: f32,
    /// Set when either pole had fewer than 5 reference examples at bake time.
    pub low_confidence: bool,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            name: String::new(),
            positive_factor: 1.0,
            negative_factor: 1.0,
            low_confidence: false,
        }
    }
}

/// Calibration metadata persisted under the `__calibration__` key.
///
/// One record per index.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CalibrationMetadata {
    pub version: u32,
    pub embedding_model_id: String,
    pub dimension: usize,
    /// Per-lens, per-pole correction factors.
    pub per_lens_factors: BTreeMap<String, (f32, f32)>,
    /// Per-lens separation power snapshot at the end of calibration.
    pub separation_powers: BTreeMap<String, f32>,
    pub iteration_count: u32,
    pub stalled: bool,
}

impl CalibrationMetadata {
    pub const KEY: &'static str = "__calibration__";
}

/// Per-lens score pair for a single scanned line.
pub type PerLensScores = BTreeMap<String, (f32, f32)>;

/// A single scannable line's reading: per-lens (pos, neg) scores.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LineReading {
    /// 1-based line number in the source document.
    pub index: usize,
    pub text: String,
    pub per_lens: PerLensScores,
}

/// A line on which two or more lenses are positively active above threshold.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Convergence {
    pub line_index: usize,
    pub lenses: Vec<String>,
}

/// A line on which exactly one lens is positively dominant while another
/// is negatively dominant.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Tension {
    pub line_index: usize,
    pub dominant_lens: String,
    pub opposing_lens: String,
}

/// Per-lens aggregate means, rescaled into `[0, 10]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct LensAggregate {
    pub pos_mean: f32,
    pub neg_mean: f32,
}

/// The full reading produced by a scan of a document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DocumentReading {
    pub lines_scanned: usize,
    pub aggregates: BTreeMap<String, LensAggregate>,
    pub lines: Vec<LineReading>,
    pub convergences: Vec<Convergence>,
    pub tensions: Vec<Tension>,
}

impl DocumentReading {
    /// The all-zeros reading for an empty document or a document with no
    /// scannable lines.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            lines_scanned: 0,
            aggregates: BTreeMap::new(),
            lines: Vec::new(),
            convergences: Vec::new(),
            tensions: Vec::new(),
        }
    }
}
