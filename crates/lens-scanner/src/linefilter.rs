//! The scannable-line filter (spec §3): length, format, and
//! alphabetic-ratio gates applied to each line of an input document.

const MIN_LEN: usize = 30;
const MAX_LEN: usize = 800;
const MIN_ALPHA_RATIO: f32 = 0.4;

fn is_heading(trimmed: &str) -> bool {
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    (1..=6).contains(&hashes) && trimmed.as_bytes().get(hashes).is_none_or(|b| *b == b' ')
}

fn is_list_bullet(trimmed: &str) -> bool {
    trimmed.starts_with("- ")
        || trimmed.starts_with("* ")
        || trimmed.starts_with("+ ")
        || (trimmed.chars().next().is_some_and(|c| c.is_ascii_digit())
            && (trimmed.contains(". ") || trimmed.contains(") ")))
}

fn is_table_row(trimmed: &str) -> bool {
    trimmed.starts_with('|') || trimmed.ends_with('|')
}

fn is_blockquote(trimmed: &str) -> bool {
    trimmed.starts_with('>')
}

fn is_html_tag_line(trimmed: &str) -> bool {
    trimmed.starts_with('<') && trimmed.ends_with('>')
}

fn is_fence_delimiter(trimmed: &str) -> bool {
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

fn alphabetic_ratio(text: &str) -> f32 {
    if text.is_empty() {
        return 0.0;
    }
    let alpha = text.chars().filter(|c| c.is_alphabetic()).count();
    alpha as f32 / text.chars().count() as f32
}

/// Whether a single line, in isolation, would pass the format/length/
/// alphabetic-ratio gates. Does not account for fenced-block state —
/// callers scanning a whole document should use [`scannable_lines`].
#[must_use]
pub fn is_scannable_line(text: &str) -> bool {
    let trimmed = text.trim();
    let len = trimmed.chars().count();
    if !(MIN_LEN..=MAX_LEN).contains(&len) {
        return false;
    }
    if is_heading(trimmed)
        || is_list_bullet(trimmed)
        || is_table_row(trimmed)
        || is_blockquote(trimmed)
        || is_html_tag_line(trimmed)
        || is_fence_delimiter(trimmed)
    {
        return false;
    }
    alphabetic_ratio(trimmed) >= MIN_ALPHA_RATIO
}

/// Split `doc` into 1-based-indexed lines, apply the scannable-line
/// filter, and track fenced code blocks so lines *inside* a fence
/// (not just its delimiters) are excluded as non-prose.
#[must_use]
pub fn scannable_lines(doc: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut in_fence = false;
    for (offset, raw) in doc.lines().enumerate() {
        let line_no = offset + 1;
        let trimmed = raw.trim();
        if is_fence_delimiter(trimmed) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if is_scannable_line(raw) {
            out.push((line_no, trimmed.to_string()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_and_long_lines() {
        assert!(!is_scannable_line("too short"));
        assert!(!is_scannable_line(&"a".repeat(801)));
    }

    #[test]
    fn accepts_an_ordinary_prose_sentence() {
        assert!(is_scannable_line(
            "Ship it, I believe in this plan and where it leads us."
        ));
    }

    #[test]
    fn rejects_headings_bullets_and_tables() {
        assert!(!is_scannable_line(
            "## A heading that is definitely long enough to pass length"
        ));
        assert!(!is_scannable_line(
            "- a bullet point that is long enough to pass the length gate"
        ));
        assert!(!is_scannable_line(
            "| col one | col two | col three padded out for length |"
        ));
        assert!(!is_scannable_line(
            "> a blockquote that is long enough to pass the length gate"
        ));
    }

    #[test]
    fn rejects_low_alphabetic_ratio_lines() {
        assert!(!is_scannable_line("1234567890 1234567890 1234567890 !@#$"));
    }

    #[test]
    fn fenced_blocks_are_excluded_including_their_contents() {
        let doc = "\
A perfectly ordinary prose line that passes every scannable gate here.
```
fn this_is_code_and_long_enough_to_otherwise_pass_the_length_gate() {}
```
Another perfectly ordinary prose line that also passes every gate here.
";
        let lines = scannable_lines(doc);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0, 1);
        assert_eq!(lines[1].0, 5);
    }
}
