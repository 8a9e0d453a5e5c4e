//! # lens-config
//!
//! Layered configuration loading for the lens engine and COEF, using
//! `figment`.
//!
//! Configuration sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. User-level `~/.config/lens/config.toml`
//! 3. Project-level `./.lens/config.toml`
//! 4. Environment variables (spec §6: `EMBEDDING_MODEL_ID`,
//!    `COEF_STORE_DIR`, `INDEX_DIR` — read unprefixed, exactly as named)

mod accelerators;
mod paths;
mod thresholds;

pub mod error;
pub use accelerators::{load_accelerators, parse_accelerators, AcceleratorSet};
pub use error::ConfigError;
pub use paths::PathsConfig;
pub use thresholds::ThresholdsConfig;

use std::path::PathBuf;

use figment::providers::{Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// The full layered configuration for a lens-engine / COEF invocation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LensConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lens").join("config.toml"))
}

fn project_config_path() -> PathBuf {
    PathBuf::from(".lens").join("config.toml")
}

/// Load configuration from defaults, the user file, the project file,
/// and the three spec-mandated environment variables, in that priority
/// order.
///
/// # Errors
/// Returns [`ConfigError::Figment`] if a present config file fails to
/// parse, or if environment variable extraction fails.
pub fn load() -> Result<LensConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(LensConfig::default()));

    if let Some(user_path) = user_config_path() {
        if user_path.is_file() {
            figment = figment.merge(Toml::file(user_path));
        }
    }

    let project_path = project_config_path();
    if project_path.is_file() {
        figment = figment.merge(Toml::file(project_path));
    }

    let mut config: LensConfig = figment.extract()?;

    // The core reads only these three environment variables (spec §6),
    // unprefixed and un-namespaced; they take priority over every file
    // layer above.
    if let Ok(model_id) = std::env::var("EMBEDDING_MODEL_ID") {
        config.paths.embedding_model_id = model_id;
    }
    if let Ok(index_dir) = std::env::var("INDEX_DIR") {
        config.paths.index_dir = index_dir;
    }
    if let Ok(store_dir) = std::env::var("COEF_STORE_DIR") {
        config.paths.coef_store_dir = store_dir;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_round_trip_through_figment() {
        let config: LensConfig = Figment::from(Serialized::defaults(LensConfig::default()))
            .extract()
            .unwrap();
        assert!(config.paths.embedding_model_id.is_empty());
        assert!((config.thresholds.score_floor - 0.03).abs() < f32::EPSILON);
    }

    #[test]
    fn project_toml_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                ".lens/config.toml",
                "\
[paths]
embedding_model_id = \"fastembed/all-MiniLM-L6-v2\"

[thresholds]
score_floor = 0.05
",
            )?;

            let config: LensConfig = Figment::from(Serialized::defaults(LensConfig::default()))
                .merge(Toml::file(".lens/config.toml"))
                .extract()?;

            assert_eq!(config.paths.embedding_model_id, "fastembed/all-MiniLM-L6-v2");
            assert!((config.thresholds.score_floor - 0.05).abs() < f32::EPSILON);
            Ok(())
        });
    }

    #[test]
    fn env_vars_override_toml_for_the_three_mandated_keys() {
        Jail::expect_with(|jail| {
            jail.create_file(
                ".lens/config.toml",
                "[paths]\nindex_dir = \"/from/toml\"\n",
            )?;
            jail.set_env("INDEX_DIR", "/from/env");
            jail.set_env("EMBEDDING_MODEL_ID", "fastembed/bge-small-en-v1.5");

            let figment = Figment::from(Serialized::defaults(LensConfig::default()))
                .merge(Toml::file(".lens/config.toml"));
            let mut config: LensConfig = figment.extract()?;
            if let Ok(v) = std::env::var("INDEX_DIR") {
                config.paths.index_dir = v;
            }
            if let Ok(v) = std::env::var("EMBEDDING_MODEL_ID") {
                config.paths.embedding_model_id = v;
            }

            assert_eq!(config.paths.index_dir, "/from/env");
            assert_eq!(config.paths.embedding_model_id, "fastembed/bge-small-en-v1.5");
            Ok(())
        });
    }
}
