//! # lens-core
//!
//! Shared data model and cross-cutting error types for the lens engine.
//!
//! Domain-specific errors (e.g. `CorpusError`, `ScanError`) are defined in
//! their respective crates. [`CoreError`] covers failures that can
//! originate from any crate in the system.

pub mod errors;
pub mod identity;
pub mod model;

pub use errors::CoreError;
pub use identity::{content_id, sha256_hex};
pub use model::{
    CalibrationMetadata, Convergence, DocumentReading, Lens, LineReading, Pole, ReferenceExample,
    Tension,
};
