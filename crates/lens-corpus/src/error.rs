//! Reference Corpus Parser error types.

/// Errors that can occur while parsing a reference corpus document.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// A fenced code block (```` ``` ````) was opened but never closed.
    #[error("unclosed fenced block starting at line {line}")]
    UnclosedFence { line: usize },
}
