//! # lens-corpus
//!
//! Parses a human-maintained markdown reference corpus into
//! `(lens, pole, examples)` groups (spec §4.1). The grammar is
//! deliberately shallow — headings and fences only, no full commonmark —
//! matching how this codebase treats markdown as a structured outline
//! rather than a rendering target.

mod parser;

pub mod error;
pub use error::CorpusError;
pub use parser::parse;

use lens_core::Pole;

/// One `(lens, pole)` section of a parsed reference corpus, with its
/// example texts in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LensGroup {
    pub lens_name: String,
    pub pole: Pole,
    pub examples: Vec<String>,
}

/// A non-fatal issue surfaced while parsing the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusWarning {
    /// A lens section had no examples under one (or both) of its poles
    /// and was excluded from the returned groups.
    LensUnderpopulated { lens_name: String, pole: Pole },
}

/// The result of parsing a reference corpus document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCorpus {
    pub groups: Vec<LensGroup>,
    pub warnings: Vec<CorpusWarning>,
}
