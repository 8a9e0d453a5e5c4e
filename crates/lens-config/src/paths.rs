//! Storage location and embedding model configuration (spec §6: the core
//! reads only `EMBEDDING_MODEL_ID`, `COEF_STORE_DIR`, `INDEX_DIR`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lens")
}

fn default_index_dir() -> String {
    default_cache_root().join("index").to_string_lossy().into_owned()
}

fn default_coef_store_dir() -> String {
    default_cache_root()
        .join("coef-store")
        .to_string_lossy()
        .into_owned()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Opaque embedding model identifier, persisted into calibration
    /// metadata and checked against at scan time. Empty means unset.
    #[serde(default)]
    pub embedding_model_id: String,

    /// Directory containing the on-disk Vector Index.
    #[serde(default = "default_index_dir")]
    pub index_dir: String,

    /// Directory containing the on-disk COEF blob store.
    #[serde(default = "default_coef_store_dir")]
    pub coef_store_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            embedding_model_id: String::new(),
            index_dir: default_index_dir(),
            coef_store_dir: default_coef_store_dir(),
        }
    }
}
