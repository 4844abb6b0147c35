//! Output file naming for batch generation.

use std::sync::OnceLock;

use chrono::{DateTime, Local};
use regex::{Captures, Regex};

use crate::data::Record;

const EXTENSION: &str = ".docx";

/// Characters that may not appear in a file name on common platforms.
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

fn rule_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([^{}]+)\}\}|\{([^{}]+)\}").unwrap())
}

/// Replace characters that are invalid in file names with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if INVALID_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

fn with_extension(mut name: String) -> String {
    if !name.to_lowercase().ends_with(EXTENSION) {
        name.push_str(EXTENSION);
    }
    name
}

/// Build a file name from a naming rule.
///
/// `{{key}}` and `{key}` are replaced with the record's value; tokens for
/// keys the record lacks are kept. `.docx` is appended when missing.
pub fn file_name_from_rule(rule: &str, record: &Record) -> String {
    let expanded = rule_token_regex().replace_all(rule, |caps: &Captures<'_>| {
        let key = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        record
            .text(key)
            .unwrap_or_else(|| caps[0].to_string())
    });
    sanitize_file_name(&with_extension(expanded.trim().to_string()))
}

/// Default name: `<document_type>_<MMddHHmmss>_<records>_<index>.docx`.
pub fn default_file_name(
    document_type: &str,
    timestamp: DateTime<Local>,
    record_count: usize,
    index: usize,
) -> String {
    let name = format!(
        "{}_{}_{}_{}{}",
        document_type,
        timestamp.format("%m%d%H%M%S"),
        record_count,
        index,
        EXTENSION
    );
    sanitize_file_name(&name)
}

/// Make `name` unique: `taken` decides whether a candidate is in use.
///
/// The first free candidate among `name`, `stem_1.docx`, `stem_2.docx`, ...
/// is returned.
pub(crate) fn unique_name(name: &str, mut taken: impl FnMut(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }
    let stem = name
        .len()
        .checked_sub(EXTENSION.len())
        .filter(|&cut| name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(EXTENSION))
        .map_or(name, |cut| &name[..cut]);

    (1..)
        .map(|k| format!("{stem}_{k}{EXTENSION}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rule_with_both_token_styles() {
        let record = Record::new().with("Name", "张三").with("Case", "2024-01");
        assert_eq!(file_name_from_rule("{{Name}}_{Case}", &record), "张三_2024-01.docx");
    }

    #[test]
    fn test_rule_keeps_unknown_tokens_and_extension() {
        let record = Record::new().with("Name", "A");
        assert_eq!(file_name_from_rule("{Name}-{Other}.DOCX", &record), "A-{Other}.DOCX");
    }

    #[test]
    fn test_rule_sanitizes_values() {
        let record = Record::new().with("Path", "a/b:c");
        assert_eq!(file_name_from_rule("{{Path}}", &record), "a_b_c.docx");
    }

    #[test]
    fn test_default_file_name() {
        let ts = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(default_file_name("Notice", ts, 5, 2), "Notice_0307090502_5_2.docx");
    }

    #[test]
    fn test_unique_name() {
        let existing = ["a.docx", "a_1.docx"];
        let name = unique_name("a.docx", |n| existing.contains(&n));
        assert_eq!(name, "a_2.docx");
        assert_eq!(unique_name("b.docx", |_| false), "b.docx");
    }
}
