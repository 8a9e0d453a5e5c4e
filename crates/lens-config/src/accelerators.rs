//! TOML-loadable accelerator overrides (SPEC_FULL.md supplemented
//! feature): spec §4.5 lets the Scanner accept per-lens
//! `{name -> (pos_mult, neg_mult)}` multipliers but leaves how a CLI
//! caller supplies them unspecified. This is a small, optional on-disk
//! format for that; library callers can still build the map directly.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// One lens's accelerator multipliers, as they appear in the TOML file.
#[derive(Debug, Clone, Copy, Deserialize)]
struct AcceleratorEntry {
    #[serde(default = "one")]
    positive: f32,
    #[serde(default = "one")]
    negative: f32,
}

const fn one() -> f32 {
    1.0
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AcceleratorFile {
    #[serde(default)]
    lenses: BTreeMap<String, AcceleratorEntry>,
}

/// Per-lens `(positive_multiplier, negative_multiplier)` overrides, in the
/// shape [`lens_scanner::AcceleratorSet`] expects.
pub type AcceleratorSet = BTreeMap<String, (f32, f32)>;

/// Parse an accelerators TOML document.
///
/// Expected shape:
///
/// ```toml
/// [lenses.red]
/// positive = 1.2
/// negative = 0.9
/// ```
///
/// # Errors
/// Returns [`ConfigError::InvalidAccelerators`] if the document is not
/// valid TOML or does not match the expected shape.
pub fn parse_accelerators(text: &str) -> Result<AcceleratorSet, ConfigError> {
    let file: AcceleratorFile =
        toml::from_str(text).map_err(|e| ConfigError::InvalidAccelerators {
            path: "<string>".to_string(),
            reason: e.to_string(),
        })?;
    Ok(file
        .lenses
        .into_iter()
        .map(|(name, entry)| (name, (entry.positive, entry.negative)))
        .collect())
}

/// Load an accelerators TOML file from disk.
///
/// # Errors
/// Returns [`ConfigError::InvalidAccelerators`] if the file cannot be
/// read or parsed.
pub fn load_accelerators(path: &Path) -> Result<AcceleratorSet, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidAccelerators {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_accelerators(&text).map_err(|err| match err {
        ConfigError::InvalidAccelerators { reason, .. } => ConfigError::InvalidAccelerators {
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_per_lens_multipliers() {
        let toml = "\
[lenses.red]
positive = 1.2
negative = 0.9

[lenses.blue]
positive = 0.8
";
        let set = parse_accelerators(toml).unwrap();
        assert_eq!(set.get("red"), Some(&(1.2, 0.9)));
        assert_eq!(set.get("blue"), Some(&(0.8, 1.0)));
    }

    #[test]
    fn empty_document_yields_empty_set() {
        assert!(parse_accelerators("").unwrap().is_empty());
    }

    #[test]
    fn malformed_toml_is_reported() {
        let err = parse_accelerators("not = [valid").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAccelerators { .. }));
    }

    #[test]
    fn load_from_path_reads_and_parses_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accelerators.toml");
        std::fs::write(&path, "[lenses.red]\npositive = 1.5\n").unwrap();
        let set = load_accelerators(&path).unwrap();
        assert_eq!(set.get("red"), Some(&(1.5, 1.0)));
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let err = load_accelerators(Path::new("/nonexistent/accelerators.toml")).unwrap_err();
        match err {
            ConfigError::InvalidAccelerators { path, .. } => {
                assert!(path.contains("accelerators.toml"));
            }
            other => panic!("expected InvalidAccelerators, got {other:?}"),
        }
    }
}
