//! Subcommand handlers. Each returns a process exit code per spec §6;
//! errors that don't map to a specific code bubble up via `anyhow` and
//! exit 1 from `main`.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use coef::{Executor, Outcome, Store};
use lens_baker::BakeReport;
use lens_config::LensConfig;
use lens_corpus::CorpusError;
use lens_embeddings::{EmbeddingProvider, FastEmbedProvider};
use lens_index::Index;
use lens_scanner::{ScanError, Scanner, ScannerConfig};

use crate::cli::{BakeArgs, CompressArgs, DescribeLensArgs, ListLensesArgs, ScanArgs};

const EXIT_OK: i32 = 0;
const EXIT_CORPUS_PARSE_ERROR: i32 = 2;
const EXIT_EMBEDDING_ERROR: i32 = 3;
const EXIT_CALIBRATION_STALL: i32 = 4;
const EXIT_CALIBRATION_MISMATCH: i32 = 5;
const EXIT_COEF_VERB_ERROR: i32 = 6;
const EXIT_COEF_INTEGRITY_FAILURE: i32 = 7;
const EXIT_COEF_CONTENT_MISSING: i32 = 8;

fn index_path(config: &LensConfig, override_path: Option<&PathBuf>) -> PathBuf {
    override_path
        .cloned()
        .unwrap_or_else(|| PathBuf::from(&config.paths.index_dir))
}

fn store_path(config: &LensConfig, override_path: Option<&PathBuf>) -> PathBuf {
    override_path
        .cloned()
        .unwrap_or_else(|| PathBuf::from(&config.paths.coef_store_dir))
}

fn open_index(path: &Path, dimension: usize) -> anyhow::Result<Index> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    Index::open(&path.to_string_lossy(), dimension).context("opening vector index")
}

fn open_store(path: &Path) -> anyhow::Result<Store> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    Store::open(&path.to_string_lossy()).context("opening COEF blob store")
}

pub fn bake(args: &BakeArgs, config: &LensConfig) -> anyhow::Result<i32> {
    let corpus_text = std::fs::read_to_string(&args.corpus)
        .with_context(|| format!("reading corpus {}", args.corpus.display()))?;

    let embedder = match FastEmbedProvider::new() {
        Ok(e) => e,
        Err(err) => {
            eprintln!("lensctl: embedding provider error: {err}");
            return Ok(EXIT_EMBEDDING_ERROR);
        }
    };

    let index_path = index_path(config, args.index.as_ref());
    let index = open_index(&index_path, embedder.dimension())?;

    let baker_config = lens_baker::BakerConfig {
        calibration_epsilon: config.thresholds.calibration_epsilon,
        calibration_max_iterations: config.thresholds.calibration_max_iterations,
        min_examples_for_confidence: config.thresholds.min_examples_for_confidence as usize,
    };
    let report = match lens_baker::bake(&corpus_text, &embedder, &index, baker_config) {
        Ok(report) => report,
        Err(lens_baker::CalibrationError::Corpus(CorpusError::UnclosedFence { line })) => {
            eprintln!("lensctl: corpus parse error: unclosed fenced block at line {line}");
            return Ok(EXIT_CORPUS_PARSE_ERROR);
        }
        Err(lens_baker::CalibrationError::Embedding(err)) => {
            eprintln!("lensctl: embedding provider error: {err}");
            return Ok(EXIT_EMBEDDING_ERROR);
        }
        Err(err) => return Err(err.into()),
    };

    print_bake_report(&report);

    if report.stalled && !args.allow_stall {
        eprintln!("lensctl: calibration did not converge; pass --allow-stall to accept anyway");
        return Ok(EXIT_CALIBRATION_STALL);
    }

    Ok(EXIT_OK)
}

fn print_bake_report(report: &BakeReport) {
    for (name, (pos, neg)) in &report.per_lens_factors {
        let separation = report.separation_powers.get(name).copied().unwrap_or(0.0);
        println!("{name}: pos_factor={pos:.4} neg_factor={neg:.4} separation={separation:.4}");
    }
    for warning in &report.warnings {
        println!("warning: {warning:?}");
    }
}

pub fn scan(args: &ScanArgs, config: &LensConfig) -> anyhow::Result<i32> {
    let doc_text = std::fs::read_to_string(&args.doc)
        .with_context(|| format!("reading document {}", args.doc.display()))?;

    let embedder = match FastEmbedProvider::new() {
        Ok(e) => e,
        Err(err) => {
            eprintln!("lensctl: embedding provider error: {err}");
            return Ok(EXIT_EMBEDDING_ERROR);
        }
    };

    let index_path = index_path(config, args.index.as_ref());
    let index = open_index(&index_path, embedder.dimension())?;

    let accelerators = match &args.accelerators {
        Some(path) => Some(lens_config::load_accelerators(path)?),
        None => None,
    };

    let scanner_config = ScannerConfig {
        top_k: config.thresholds.top_k as usize,
        score_floor: config.thresholds.score_floor,
        tau_convergence: config.thresholds.tau_convergence,
        tau_tension: config.thresholds.tau_tension,
    };
    let scanner = Scanner::new(scanner_config);
    let reading = match scanner.scan(&doc_text, &index, &embedder, accelerators.as_ref(), None) {
        Ok(reading) => reading,
        Err(ScanError::Embedding(err)) => {
            eprintln!("lensctl: embedding provider error: {err}");
            return Ok(EXIT_EMBEDDING_ERROR);
        }
        Err(ScanError::CalibrationModelMismatch { baked, current }) => {
            eprintln!(
                "lensctl: calibration model mismatch: index was baked with {baked}, scanner uses {current}"
            );
            return Ok(EXIT_CALIBRATION_MISMATCH);
        }
        Err(err) => return Err(err.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reading)?);
    } else {
        println!("lines scanned: {}", reading.lines_scanned);
        for (name, aggregate) in &reading.aggregates {
            println!("{name}: pos={:.2} neg={:.2}", aggregate.pos_mean, aggregate.neg_mean);
        }
        for convergence in &reading.convergences {
            println!(
                "convergence at line {}: {}",
                convergence.line_index,
                convergence.lenses.join(", ")
            );
        }
        for tension in &reading.tensions {
            println!(
                "tension at line {}: {} vs {}",
                tension.line_index, tension.dominant_lens, tension.opposing_lens
            );
        }
    }

    Ok(EXIT_OK)
}

pub fn compress(args: &CompressArgs, config: &LensConfig) -> anyhow::Result<i32> {
    let program = coef::parse(&args.pipeline).context("parsing COEF pipeline")?;

    let mut input = Vec::new();
    std::io::stdin()
        .read_to_end(&mut input)
        .context("reading stdin")?;

    let store_path = store_path(config, args.store.as_ref());
    let store = open_store(&store_path)?;
    let executor = Executor::new(&store);

    match executor.execute(&program, &input) {
        Ok(Outcome::Done(bytes)) => {
            use std::io::Write;
            std::io::stdout().write_all(&bytes)?;
            Ok(EXIT_OK)
        }
        Ok(Outcome::Verified(bytes)) => {
            use std::io::Write;
            std::io::stdout().write_all(&bytes)?;
            Ok(EXIT_OK)
        }
        Err(err @ (coef::CoefError::UnknownVerb(_) | coef::CoefError::ArgumentMissing { .. })) => {
            eprintln!("lensctl: {err}");
            Ok(EXIT_COEF_VERB_ERROR)
        }
        Err(err @ coef::CoefError::IntegrityFailure { .. }) => {
            eprintln!("lensctl: {err}");
            Ok(EXIT_COEF_INTEGRITY_FAILURE)
        }
        Err(err @ coef::CoefError::ContentMissing(_)) => {
            eprintln!("lensctl: {err}");
            Ok(EXIT_COEF_CONTENT_MISSING)
        }
        Err(err) => Err(err.into()),
    }
}

pub fn list_lenses(args: &ListLensesArgs, config: &LensConfig) -> anyhow::Result<i32> {
    let index_path = index_path(config, args.index.as_ref());
    let dimension = lens_embeddings::DEFAULT_DIMENSION;
    let index = open_index(&index_path, dimension)?;
    for name in index.list_lenses()? {
        println!("{name}");
    }
    Ok(EXIT_OK)
}

pub fn describe_lens(args: &DescribeLensArgs, config: &LensConfig) -> anyhow::Result<i32> {
    let index_path = index_path(config, args.index.as_ref());
    let dimension = lens_embeddings::DEFAULT_DIMENSION;
    let index = open_index(&index_path, dimension)?;
    let calibration = index.get_calibration().context("reading calibration metadata")?;

    let Some((pos, neg)) = calibration.per_lens_factors.get(&args.lens_name) else {
        anyhow::bail!("no lens named {:?} in this index", args.lens_name);
    };
    let separation = calibration
        .separation_powers
        .get(&args.lens_name)
        .copied()
        .unwrap_or(0.0);

    println!("lens: {}", args.lens_name);
    println!("positive_factor: {pos:.4}");
    println!("negative_factor: {neg:.4}");
    println!("separation_power: {separation:.4}");
    println!("embedding_model_id: {}", calibration.embedding_model_id);
    println!("stalled: {}", calibration.stalled);

    Ok(EXIT_OK)
}
