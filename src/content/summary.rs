use crate::error::Result;
use regex::Regex;

pub const DEFAULT_SUMMARY_LENGTH: usize = 300;
pub const TRUNCATION_MARKER: &str = "...";

/// Turns feed-supplied HTML snippets into short plain-text summaries.
///
/// Tags are removed with a permissive `<[^>]+>` match rather than a real
/// HTML parser, so malformed markup can leave stray characters behind.
#[derive(Debug, Clone)]
pub struct SummaryCleaner {
    tag: Regex,
    max_length: usize,
}

impl SummaryCleaner {
    pub fn new(max_length: usize) -> Result<Self> {
        Ok(Self {
            tag: Regex::new(r"<[^>]+>")?,
            max_length,
        })
    }

    /// Strip tags, trim, then cut to `max_length` characters.
    pub fn clean(&self, raw: &str) -> String {
        let stripped = self.tag.replace_all(raw, "");
        truncate_chars(stripped.trim(), self.max_length)
    }
}

/// Cut `text` to at most `max` characters, appending [`TRUNCATION_MARKER`]
/// when anything was removed.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}
