//! Line-oriented scan of the reference corpus grammar (spec §4.1).

use std::collections::BTreeSet;

use lens_core::Pole;

use crate::{CorpusError, CorpusWarning, LensGroup, ParsedCorpus};

fn heading_level(trimmed: &str) -> usize {
    trimmed.chars().take_while(|c| *c == '#').count()
}

fn heading_text(trimmed: &str, level: usize) -> String {
    trimmed[level..].trim().to_string()
}

fn parse_pole(text: &str) -> Option<Pole> {
    match text.trim().to_ascii_uppercase().as_str() {
        "POSITIVE" => Some(Pole::Positive),
        "NEGATIVE" => Some(Pole::Negative),
        _ => None,
    }
}

fn push_example(groups: &mut Vec<LensGroup>, lens_name: &str, pole: Pole, text: String) {
    if let Some(group) = groups
        .iter_mut()
        .find(|g| g.lens_name == lens_name && g.pole == pole)
    {
        group.examples.push(text);
    } else {
        groups.push(LensGroup {
            lens_name: lens_name.to_string(),
            pole,
            examples: vec![text],
        });
    }
}

fn flush_paragraph(
    buf: &mut Vec<String>,
    groups: &mut Vec<LensGroup>,
    lens: Option<&str>,
    pole: Option<Pole>,
) {
    if buf.is_empty() {
        return;
    }
    let text = buf.join(" ").trim().to_string();
    buf.clear();
    if text.is_empty() {
        return;
    }
    if let (Some(lens), Some(pole)) = (lens, pole) {
        push_example(groups, lens, pole, text);
    }
}

/// Parse a reference corpus document.
///
/// # Errors
/// Returns [`CorpusError::UnclosedFence`] if a fenced block is opened
/// but the document ends before it closes.
pub fn parse(text: &str) -> Result<ParsedCorpus, CorpusError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut i = 0usize;

    let mut current_lens: Option<String> = None;
    let mut current_pole: Option<Pole> = None;
    let mut groups: Vec<LensGroup> = Vec::new();
    let mut lens_names_seen: Vec<String> = Vec::new();
    let mut paragraph_buf: Vec<String> = Vec::new();

    while i < lines.len() {
        let line_no = i + 1;
        let raw = lines[i];
        let trimmed = raw.trim();
        let level = heading_level(trimmed);
        let is_heading = level > 0 && level <= 6 && trimmed.as_bytes().get(level).is_none_or(|b| *b == b' ');

        if is_heading && level == 1 {
            flush_paragraph(
                &mut paragraph_buf,
                &mut groups,
                current_lens.as_deref(),
                current_pole,
            );
            break;
        }

        if is_heading && level == 2 {
            flush_paragraph(
                &mut paragraph_buf,
                &mut groups,
                current_lens.as_deref(),
                current_pole,
            );
            let name = heading_text(trimmed, level).to_lowercase();
            lens_names_seen.push(name.clone());
            current_lens = Some(name);
            current_pole = None;
            i += 1;
            continue;
        }

        if is_heading && level == 3 {
            flush_paragraph(
                &mut paragraph_buf,
                &mut groups,
                current_lens.as_deref(),
                current_pole,
            );
            if let Some(pole) = parse_pole(&heading_text(trimmed, level)) {
                current_pole = Some(pole);
            } else {
                current_pole = None;
            }
            i += 1;
            continue;
        }

        if is_heading {
            flush_paragraph(
                &mut paragraph_buf,
                &mut groups,
                current_lens.as_deref(),
                current_pole,
            );
            i += 1;
            continue;
        }

        if current_lens.is_none() || current_pole.is_none() {
            i += 1;
            continue;
        }

        if trimmed.starts_with("```") {
            flush_paragraph(
                &mut paragraph_buf,
                &mut groups,
                current_lens.as_deref(),
                current_pole,
            );
            let fence_start = line_no;
            i += 1;
            let mut body: Vec<&str> = Vec::new();
            let mut closed = false;
            while i < lines.len() {
                if lines[i].trim().starts_with("```") {
                    closed = true;
                    i += 1;
                    break;
                }
                body.push(lines[i]);
                i += 1;
            }
            if !closed {
                return Err(CorpusError::UnclosedFence { line: fence_start });
            }
            let text = body.join("\n").trim().to_string();
            if !text.is_empty() {
                push_example(
                    &mut groups,
                    current_lens.as_ref().unwrap(),
                    current_pole.unwrap(),
                    text,
                );
            }
            continue;
        }

        if trimmed.is_empty() {
            flush_paragraph(
                &mut paragraph_buf,
                &mut groups,
                current_lens.as_deref(),
                current_pole,
            );
            i += 1;
            continue;
        }

        paragraph_buf.push(trimmed.to_string());
        i += 1;
    }

    flush_paragraph(
        &mut paragraph_buf,
        &mut groups,
        current_lens.as_deref(),
        current_pole,
    );

    let mut warnings = Vec::new();
    let mut excluded_lenses: BTreeSet<String> = BTreeSet::new();
    let mut seen_once: BTreeSet<String> = BTreeSet::new();
    for name in &lens_names_seen {
        if !seen_once.insert(name.clone()) {
            continue;
        }
        for pole in [Pole::Positive, Pole::Negative] {
            let has_examples = groups
                .iter()
                .any(|g| g.lens_name == *name && g.pole == pole && !g.examples.is_empty());
            if !has_examples {
                warnings.push(CorpusWarning::LensUnderpopulated {
                    lens_name: name.clone(),
                    pole,
                });
                excluded_lenses.insert(name.clone());
            }
        }
    }

    groups.retain(|g| !excluded_lenses.contains(&g.lens_name));

    Ok(ParsedCorpus { groups, warnings })
}
