//! Placeholder scanning and substitution.
//!
//! A paragraph is rewritten in one non-recursive pass over its concatenated
//! run text. When every matched placeholder sits inside a single run, only
//! those runs change and all sibling formatting survives. When a placeholder
//! is fragmented across runs, the substituted text is written into the first
//! run and the remaining runs are removed.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::data::{normalize_key, Record};
use crate::model::Paragraph;

/// Matches `{{key}}`; the key is capture group 1.
pub fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([^{}]+)\}\}").unwrap())
}

fn marker_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^LOOP_[A-Za-z0-9_]+_(?:START|END)$").unwrap())
}

/// Whether a placeholder key is a loop marker (`LOOP_<name>_START` / `_END`).
pub fn is_marker_key(key: &str) -> bool {
    marker_key_regex().is_match(key)
}

/// Placeholder keys in `text`, in order of first appearance, without
/// duplicates and without loop markers.
pub fn placeholders_in(text: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for caps in placeholder_regex().captures_iter(text) {
        let key = normalize_key(&caps[1]).into_owned();
        if !is_marker_key(&key) && !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// What a paragraph rewrite did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rewrite {
    /// Placeholders replaced
    pub replaced: usize,
    /// Whether fragmented placeholders forced the runs to be merged
    pub collapsed: bool,
}

struct Replacement {
    range: Range<usize>,
    value: String,
}

/// Rewrite every placeholder that `resolve` has a value for.
///
/// Unresolved placeholders stay literal. Replacement values are never
/// rescanned.
pub fn rewrite_paragraph<F>(paragraph: &mut Paragraph, resolve: F) -> Rewrite
where
    F: Fn(&str) -> Option<String>,
{
    let full = paragraph.plain_text();
    if !full.contains("{{") {
        return Rewrite::default();
    }

    let replacements: Vec<Replacement> = placeholder_regex()
        .captures_iter(&full)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let value = resolve(&caps[1])?;
            Some(Replacement {
                range: whole.range(),
                value,
            })
        })
        .collect();

    if replacements.is_empty() {
        return Rewrite::default();
    }

    let spans = run_spans(paragraph);
    let fragmented = replacements
        .iter()
        .any(|r| !spans.iter().any(|s| s.start <= r.range.start && r.range.end <= s.end));

    if fragmented {
        let merged = apply(&full, 0, &replacements);
        collapse_into_first_run(paragraph, merged);
    } else {
        for (run, span) in paragraph.runs_mut().zip(&spans) {
            let local: Vec<&Replacement> = replacements
                .iter()
                .filter(|r| span.start <= r.range.start && r.range.end <= span.end)
                .collect();
            if !local.is_empty() {
                run.text = apply_refs(&run.text, span.start, &local);
            }
        }
    }

    Rewrite {
        replaced: replacements.len(),
        collapsed: fragmented,
    }
}

/// Byte span of each run inside the paragraph's concatenated text.
fn run_spans(paragraph: &Paragraph) -> Vec<Range<usize>> {
    let mut offset = 0;
    paragraph
        .runs()
        .map(|run| {
            let span = offset..offset + run.text.len();
            offset = span.end;
            span
        })
        .collect()
}

fn apply(text: &str, base: usize, replacements: &[Replacement]) -> String {
    let refs: Vec<&Replacement> = replacements.iter().collect();
    apply_refs(text, base, &refs)
}

fn apply_refs(text: &str, base: usize, replacements: &[&Replacement]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for r in replacements {
        let start = r.range.start - base;
        out.push_str(&text[cursor..start]);
        out.push_str(&r.value);
        cursor = r.range.end - base;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Put `text` into the first run and drop the other runs.
fn collapse_into_first_run(paragraph: &mut Paragraph, text: String) {
    paragraph.keep_first_run();
    if let Some(run) = paragraph.runs_mut().next() {
        run.text = text;
    }
}

/// Substitute placeholders with values from `record`.
///
/// Keys missing from the record stay literal; null values become empty.
pub fn substitute_paragraph(paragraph: &mut Paragraph, record: &Record) -> Rewrite {
    rewrite_paragraph(paragraph, |key| record.text(key))
}

/// Remove every loop marker token from the paragraph.
pub fn strip_markers(paragraph: &mut Paragraph) -> usize {
    rewrite_paragraph(paragraph, |key| is_marker_key(key).then(String::new)).replaced
}
