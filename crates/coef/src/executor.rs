//! The nine-verb pipeline executor (spec §4.6).
//!
//! Executes a [`Program`] left-to-right against a [`Store`]: each step
//! receives the previous step's output as its implicit `in`. Execution
//! is all-or-nothing per the state machine in spec §4.6 — `Ready ->
//! Executing(i) -> {Failed | Verified | Done}` — the first failing step
//! terminates the run; there are no retries and no partial results.

use regex::Regex;

use crate::error::CoefError;
use crate::grammar::{Instruction, Program};
use crate::store::Store;

/// The terminal, non-failing outcome of a program execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The program completed with no `verify:hash=` post-condition.
    Done(Vec<u8>),
    /// The program completed and its final output matched the
    /// `verify:hash=` post-condition.
    Verified(Vec<u8>),
}

impl Outcome {
    /// The final output bytes, regardless of whether verification ran.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Done(bytes) | Self::Verified(bytes) => bytes,
        }
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Done(bytes) | Self::Verified(bytes) => bytes,
        }
    }
}

/// Executes COEF programs against a read-only reference to a [`Store`].
pub struct Executor<'a> {
    store: &'a Store,
}

impl<'a> Executor<'a> {
    #[must_use]
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Run `program` against `input` bytes as the implicit input to the
    /// first step.
    ///
    /// # Errors
    /// Returns [`CoefError::UnknownVerb`] for a verb outside the closed
    /// nine-verb set, [`CoefError::ArgumentMissing`] if a required
    /// argument is absent, [`CoefError::ContentMissing`] if `clone`
    /// names a hash not present in the store, [`CoefError::EncodingError`]
    /// if a text-oriented verb receives non-UTF-8 input, or
    /// [`CoefError::IntegrityFailure`] if a trailing `verify:hash=`
    /// post-condition does not match the final output.
    pub fn execute(&self, program: &Program, input: &[u8]) -> Result<Outcome, CoefError> {
        let mut current = input.to_vec();

        for (step_index, instruction) in program.instructions.iter().enumerate() {
            current = self.run_step(instruction, &current).map_err(|err| {
                tracing::warn!(step = step_index, verb = %instruction.verb, error = %err, "coef step failed");
                err
            })?;
        }

        if let Some(expected) = &program.verify_hash {
            let actual = lens_core::sha256_hex(&current);
            if actual != *expected {
                return Err(CoefError::IntegrityFailure {
                    expected: expected.clone(),
                    actual,
                });
            }
            return Ok(Outcome::Verified(current));
        }

        Ok(Outcome::Done(current))
    }

    fn run_step(&self, instruction: &Instruction, input: &[u8]) -> Result<Vec<u8>, CoefError> {
        match instruction.verb.as_str() {
            "literal" => literal(instruction),
            "store" => self.store_verb(input),
            "clone" => self.clone_verb(instruction, input),
            "swap" => swap(instruction, input),
            "rename" => rename(instruction, input),
            "inject" => inject(instruction, input),
            "regex" => regex_verb(instruction, input),
            "compose" => self.compose_verb(instruction, input),
            "pipe" => Err(CoefError::UnknownVerb(
                "pipe is a wire-grammar separator, not an executable instruction".to_string(),
            )),
            other => Err(CoefError::UnknownVerb(other.to_string())),
        }
    }

    fn store_verb(&self, input: &[u8]) -> Result<Vec<u8>, CoefError> {
        let hash = self.store.put(input)?;
        Ok(hash.into_bytes())
    }

    fn clone_verb(&self, instruction: &Instruction, input: &[u8]) -> Result<Vec<u8>, CoefError> {
        let hash = match instruction.args.get("src") {
            Some(src) => src.clone(),
            None => as_utf8("clone", input)?.to_string(),
        };
        self.store.get(&hash)
    }

    fn compose_verb(&self, instruction: &Instruction, input: &[u8]) -> Result<Vec<u8>, CoefError> {
        let with = require_arg(instruction, "with")?;
        let mut out = input.to_vec();
        out.extend_from_slice(&resolve_content(self.store, with)?);
        Ok(out)
    }
}

fn require_arg<'i>(instruction: &'i Instruction, key: &str) -> Result<&'i String, CoefError> {
    instruction
        .args
        .get(key)
        .ok_or_else(|| CoefError::ArgumentMissing {
            verb: instruction.verb.clone(),
            arg: key.to_string(),
        })
}

fn as_utf8<'b>(verb: &str, bytes: &'b [u8]) -> Result<&'b str, CoefError> {
    std::str::from_utf8(bytes).map_err(|_| CoefError::EncodingError(verb.to_string()))
}

/// `with` resolves to a stored blob if it looks like a sha256 hex digest
/// present in the store, otherwise it is treated as literal bytes.
fn resolve_content(store: &Store, with: &str) -> Result<Vec<u8>, CoefError> {
    if is_hex_digest(with) && store.exists(with)? {
        return store.get(with);
    }
    Ok(with.as_bytes().to_vec())
}

fn is_hex_digest(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}

fn literal(instruction: &Instruction) -> Result<Vec<u8>, CoefError> {
    let value = require_arg(instruction, "value")?;
    Ok(value.as_bytes().to_vec())
}

fn swap(instruction: &Instruction, input: &[u8]) -> Result<Vec<u8>, CoefError> {
    let old = require_arg(instruction, "old")?;
    let new = require_arg(instruction, "new")?;
    Ok(replace_bytes(input, old.as_bytes(), new.as_bytes()))
}

fn replace_bytes(input: &[u8], old: &[u8], new: &[u8]) -> Vec<u8> {
    if old.is_empty() {
        return input.to_vec();
    }
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if input[i..].starts_with(old) {
            out.extend_from_slice(new);
            i += old.len();
        } else {
            out.push(input[i]);
            i += 1;
        }
    }
    out
}

/// `rename` is `swap` restricted to word-boundary identifier matches
/// (spec §4.6); implemented as a regex of `\b<old>\b` over UTF-8 text.
fn rename(instruction: &Instruction, input: &[u8]) -> Result<Vec<u8>, CoefError> {
    let old = require_arg(instruction, "old")?;
    let new = require_arg(instruction, "new")?;
    let text = as_utf8("rename", input)?;

    let pattern = format!(r"\b{}\b", regex::escape(old));
    let re = Regex::new(&pattern)
        .map_err(|e| CoefError::InvalidRegex(format!("rename word-boundary pattern: {e}")))?;
    Ok(re.replace_all(text, new.as_str()).into_owned().into_bytes())
}

fn inject(instruction: &Instruction, input: &[u8]) -> Result<Vec<u8>, CoefError> {
    let value = require_arg(instruction, "value")?;
    let at = require_arg(instruction, "at")?;

    let offset = match at.as_str() {
        "start" => 0,
        "end" => input.len(),
        n => n
            .parse::<usize>()
            .map_err(|_| CoefError::MalformedInstruction(format!("inject: invalid at={n:?}")))?
            .min(input.len()),
    };

    let mut out = Vec::with_capacity(input.len() + value.len());
    out.extend_from_slice(&input[..offset]);
    out.extend_from_slice(value.as_bytes());
    out.extend_from_slice(&input[offset..]);
    Ok(out)
}

fn regex_verb(instruction: &Instruction, input: &[u8]) -> Result<Vec<u8>, CoefError> {
    let pattern = require_arg(instruction, "pattern")?;
    let replace = require_arg(instruction, "replace")?;
    let text = as_utf8("regex", input)?;

    let re = Regex::new(pattern).map_err(|e| CoefError::InvalidRegex(e.to_string()))?;
    Ok(re.replace_all(text, replace.as_str()).into_owned().into_bytes())
}
