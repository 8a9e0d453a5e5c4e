//! The COEF wire grammar: parsing and serializing instructions and
//! programs (spec §4.6, §6).
//!
//! Instructions are joined by `" | "`. Each instruction is
//! `verb[:key=value[,key=value]*]`. Keys and values that contain a
//! reserved sequence (`" | "`, `:`, `,`, `=`) are percent-encoded.
//! `pipe` itself is a separator, never a standalone instruction
//! (spec §9 open question, resolved: separator-only).

use std::collections::BTreeMap;

use crate::error::CoefError;

/// A single COEF instruction: a verb name plus its ordered arguments.
///
/// Verb validity against the closed nine-verb set is an *executor*
/// concern (spec §4.6: `UnknownVerb` is an executor-time error), so
/// parsing accepts any verb-shaped token — it just won't run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub verb: String,
    pub args: BTreeMap<String, String>,
}

impl Instruction {
    #[must_use]
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            args: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// An ordered pipeline of instructions with an optional `verify:hash=`
/// integrity post-condition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub verify_hash: Option<String>,
}

const RESERVED_SEQUENCES: [&str; 4] = [" | ", ":", ",", "="];

fn needs_encoding(s: &str) -> bool {
    RESERVED_SEQUENCES.iter().any(|seq| s.contains(seq))
}

fn encode_field(s: &str) -> String {
    if needs_encoding(s) {
        urlencoding::encode(s).into_owned()
    } else {
        s.to_string()
    }
}

fn decode_field(s: &str) -> Result<String, CoefError> {
    urlencoding::decode(s)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| CoefError::MalformedInstruction(format!("bad percent-encoding: {e}")))
}

fn encode_instruction(instr: &Instruction) -> String {
    let mut out = instr.verb.clone();
    if !instr.args.is_empty() {
        out.push(':');
        let pairs: Vec<String> = instr
            .args
            .iter()
            .map(|(k, v)| format!("{}={}", encode_field(k), encode_field(v)))
            .collect();
        out.push_str(&pairs.join(","));
    }
    out
}

fn parse_instruction(token: &str) -> Result<Instruction, CoefError> {
    let token = token.trim();
    let (verb, args_str) = match token.split_once(':') {
        Some((verb, args)) => (verb, Some(args)),
        None => (token, None),
    };
    if verb.is_empty() {
        return Err(CoefError::MalformedInstruction(format!(
            "empty verb in instruction {token:?}"
        )));
    }

    let mut args = BTreeMap::new();
    if let Some(args_str) = args_str {
        if !args_str.is_empty() {
            for pair in args_str.split(',') {
                let (key, value) = pair.split_once('=').ok_or_else(|| {
                    CoefError::MalformedInstruction(format!("malformed argument {pair:?}"))
                })?;
                args.insert(decode_field(key)?, decode_field(value)?);
            }
        }
    }

    Ok(Instruction {
        verb: verb.to_string(),
        args,
    })
}

/// Serialize a program to its canonical wire form.
#[must_use]
pub fn serialize(program: &Program) -> String {
    let mut parts: Vec<String> = program.instructions.iter().map(encode_instruction).collect();
    if let Some(hash) = &program.verify_hash {
        parts.push(format!("verify:hash={hash}"));
    }
    parts.join(" | ")
}

/// Parse a program from its wire form.
///
/// # Errors
/// Returns [`CoefError::MalformedInstruction`] if any instruction token
/// or argument pair is malformed, or if `verify` appears anywhere but
/// as the final token.
pub fn parse(text: &str) -> Result<Program, CoefError> {
    let tokens: Vec<&str> = text.split(" | ").collect();
    let mut instructions = Vec::new();
    let mut verify_hash = None;

    for (i, token) in tokens.iter().enumerate() {
        let instr = parse_instruction(token)?;
        if instr.verb == "verify" {
            if i != tokens.len() - 1 {
                return Err(CoefError::MalformedInstruction(
                    "verify must be the final token of a program".to_string(),
                ));
            }
            let hash = instr.args.get("hash").cloned().ok_or_else(|| {
                CoefError::ArgumentMissing {
                    verb: "verify".to_string(),
                    arg: "hash".to_string(),
                }
            })?;
            verify_hash = Some(hash);
        } else {
            instructions.push(instr);
        }
    }

    Ok(Program {
        instructions,
        verify_hash,
    })
}
