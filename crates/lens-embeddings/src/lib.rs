//! # lens-embeddings
//!
//! Local embedding generation for the lens engine using `fastembed` (ONNX
//! runtime). Produces fixed-dimension, L2-normalized, deterministic
//! vectors for reference examples and scanned lines alike, so the
//! Baker and Scanner can share a single contract.

use std::path::PathBuf;
use std::sync::Mutex;

use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};

pub mod error;
pub use error::EmbeddingError;

/// The deterministic text → vector contract (spec §4.2).
///
/// `embed` is pure: the same model id, version, and text always produce
/// the same vector to within `1e-6`. `embed_batch` must produce results
/// identical to calling `embed` once per element.
pub trait EmbeddingProvider {
    /// Opaque identifier for the embedding model, persisted by the Baker
    /// into calibration metadata. A mismatch at scan time is fatal.
    fn model_id(&self) -> &str;

    /// Fixed output dimension for this provider.
    fn dimension(&self) -> usize;

    /// Embed a single piece of text. Returns an L2-normalized vector.
    ///
    /// # Errors
    /// Returns [`EmbeddingError`] if the underlying model fails to run.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed a batch of texts. Must equal per-element `embed` output.
    ///
    /// # Errors
    /// Returns [`EmbeddingError`] if the underlying model fails to run.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Fixed output dimension of `AllMiniLML6V2` and `BGESmallENV15`.
pub const DEFAULT_DIMENSION: usize = 384;

/// Stable cache directory for downloaded model files.
///
/// Uses `~/.lens/cache/fastembed/` so models persist across runs and stay
/// out of the repository tree.
fn cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".lens")
        .join("cache")
        .join("fastembed")
}

/// Local embedding provider backed by `fastembed`'s `AllMiniLML6V2` model
/// (384-dim, mean pooling, no query/passage prefix required).
pub struct FastEmbedProvider {
    model_id: String,
    // fastembed's `embed` takes `&mut self`; a `Mutex` lets the provider
    // be shared behind `&self` across Scanner/Baker call sites.
    model: Mutex<TextEmbedding>,
}

impl FastEmbedProvider {
    /// Load the default model, downloading it to the stable cache dir on
    /// first run.
    ///
    /// # Errors
    /// Returns [`EmbeddingError::InitFailed`] if the model cannot be loaded.
    pub fn new() -> Result<Self, EmbeddingError> {
        let opts = TextInitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_cache_dir(cache_dir())
            .with_show_download_progress(false);
        let model = TextEmbedding::try_new(opts)
            .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;
        Ok(Self {
            model_id: "fastembed/all-MiniLM-L6-v2".to_string(),
            model: Mutex::new(model),
        })
    }
}

fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

impl EmbeddingProvider for FastEmbedProvider {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        DEFAULT_DIMENSION
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut embeddings = self.embed_batch(std::slice::from_ref(&text.to_string()))?;
        embeddings
            .pop()
            .ok_or_else(|| EmbeddingError::EmbedFailed("model returned no embedding".to_string()))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let mut model = self
            .model
            .lock()
            .map_err(|_| EmbeddingError::EmbedFailed("embedding model lock poisoned".to_string()))?;
        let raw = model
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbeddingError::EmbedFailed(e.to_string()))?;
        if raw.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                got: raw.len(),
            });
        }
        Ok(raw.into_iter().map(l2_normalize).collect())
    }
}
