use chrono::{DateTime, Utc};

use crate::content::SummaryCleaner;
use crate::error::Result;
use crate::feed::{Article, RawEntry};

pub const FINGERPRINT_LEN: usize = 12;
pub const UNTITLED: &str = "No title";

/// Short, stable identifier for a link: the leading hex digits of its BLAKE3 hash.
pub fn fingerprint(link: &str) -> String {
    let hash = blake3::hash(link.as_bytes()).to_hex();
    hash.as_str()[..FINGERPRINT_LEN].to_string()
}

/// Maps raw feed entries onto [`Article`]s.
#[derive(Debug, Clone)]
pub struct Normalizer {
    cleaner: SummaryCleaner,
}

impl Normalizer {
    pub fn new(summary_max_length: usize) -> Result<Self> {
        Ok(Self {
            cleaner: SummaryCleaner::new(summary_max_length)?,
        })
    }

    /// Returns `None` when the entry has no link; every other gap is filled
    /// with a default.
    pub fn normalize(&self, entry: &RawEntry, source: &str, category: &str) -> Option<Article> {
        self.normalize_at(entry, source, category, Utc::now())
    }

    /// Same as [`Normalizer::normalize`] with an explicit fallback instant for
    /// undated entries.
    pub fn normalize_at(
        &self,
        entry: &RawEntry,
        source: &str,
        category: &str,
        now: DateTime<Utc>,
    ) -> Option<Article> {
        let url = entry.link()?;

        let summary = entry
            .summary()
            .or_else(|| entry.description())
            .map(|raw| self.cleaner.clean(raw))
            .unwrap_or_default();

        Some(Article {
            id: fingerprint(url),
            title: entry.title().unwrap_or(UNTITLED).to_string(),
            summary,
            url: url.to_string(),
            source: source.to_string(),
            published: publication_date(entry).unwrap_or(now),
            category: category.to_string(),
        })
    }
}

/// Published date, else updated date.
pub fn publication_date(entry: &RawEntry) -> Option<DateTime<Utc>> {
    entry.published().or_else(|| entry.updated())
}
