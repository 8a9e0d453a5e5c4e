//! Top-level argument parser for the `lensctl` binary (spec §6).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// `lensctl`: bake reference corpora, scan documents, run COEF pipelines.
#[derive(Debug, Parser)]
#[command(name = "lensctl", version, about = "Lens engine and COEF toolbox")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose mode (debug logging).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build or refresh a lens index from a reference corpus.
    Bake(BakeArgs),
    /// Score a document against a baked index, emitting a Document Reading.
    Scan(ScanArgs),
    /// Execute a COEF pipeline program against stdin bytes.
    Compress(CompressArgs),
    /// List the lenses present in a baked index.
    ListLenses(ListLensesArgs),
    /// Describe one lens's calibration factors and separation power.
    DescribeLens(DescribeLensArgs),
}

#[derive(Debug, Parser)]
pub struct BakeArgs {
    /// Path to the reference corpus Markdown file.
    pub corpus: PathBuf,

    /// Path to the index directory/file (defaults to `INDEX_DIR`/config).
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Treat a calibration stall as a non-fatal warning instead of exit 4.
    #[arg(long)]
    pub allow_stall: bool,
}

#[derive(Debug, Parser)]
pub struct ScanArgs {
    /// Path to the document to scan.
    pub doc: PathBuf,

    /// Path to the index directory/file (defaults to `INDEX_DIR`/config).
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Emit the Document Reading as JSON instead of a human summary.
    #[arg(long)]
    pub json: bool,

    /// Optional TOML file of per-lens accelerator multipliers.
    #[arg(long)]
    pub accelerators: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct CompressArgs {
    /// The COEF pipeline program (wire grammar), e.g. `"literal:value=hi | store"`.
    pub pipeline: String,

    /// Path to the COEF blob store (defaults to `COEF_STORE_DIR`/config).
    #[arg(long)]
    pub store: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct ListLensesArgs {
    #[arg(long)]
    pub index: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct DescribeLensArgs {
    pub lens_name: String,

    #[arg(long)]
    pub index: Option<PathBuf>,
}
