//! Keeps the report listing inside a static `index.html` in sync with the
//! dated report files sitting next to it.
//!
//! The index page carries one JavaScript array literal per report kind, e.g.
//!
//! ```text
//! tech: [
//!                 { date: "2024-02-01", file: "reddit_tech_weekly_2024-02-01.html" }
//!             ]
//! ```
//!
//! Each literal is regenerated from the directory contents, newest first, and
//! spliced back in place of the old one.

use regex::{NoExpand, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::digest::write_atomic;
use crate::error::{Error, Result};

pub const DEFAULT_INDEX_FILE: &str = "index.html";

const ITEM_INDENT: &str = "                ";
const CLOSE_INDENT: &str = "            ";

/// A family of reports: the array key in the index page and the filename
/// prefix shared by its reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportKind {
    pub key: String,
    pub prefix: String,
}

impl ReportKind {
    pub fn new(key: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            prefix: prefix.into(),
        }
    }

    /// The weekly tech and music digests.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("tech", "reddit_tech_weekly_"),
            Self::new("music", "reddit_music_weekly_"),
        ]
    }

    /// The date part of `<prefix><date>.html`, if the name matches.
    pub fn date_of<'f>(&self, file_name: &'f str) -> Option<&'f str> {
        file_name.strip_prefix(self.prefix.as_str())?.strip_suffix(".html")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    pub date: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSummary {
    pub index_file: PathBuf,
    pub counts: Vec<(String, usize)>,
}

impl IndexSummary {
    pub fn count(&self, key: &str) -> usize {
        self.counts
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

pub struct IndexUpdater {
    dir: PathBuf,
    index_file: PathBuf,
    kinds: Vec<ReportKind>,
}

impl IndexUpdater {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        let dir = dir.into();
        let index_file = dir.join(DEFAULT_INDEX_FILE);
        Self {
            dir,
            index_file,
            kinds: ReportKind::defaults(),
        }
    }

    pub fn with_index_file<P: AsRef<Path>>(mut self, name: P) -> Self {
        self.index_file = self.dir.join(name);
        self
    }

    pub fn with_kinds(mut self, kinds: Vec<ReportKind>) -> Self {
        self.kinds = kinds;
        self
    }

    /// Report files of `kind` in the directory, newest date first.
    pub fn scan(&self, kind: &ReportKind) -> Result<Vec<ReportFile>> {
        let mut reports = Vec::new();

        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Io(e.into()))?;
            // Symlinked reports count; walkdir reports the link itself.
            if entry.file_type().is_dir() {
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                continue;
            };

            if let Some(date) = kind.date_of(name) {
                reports.push(ReportFile {
                    date: date.to_string(),
                    file: name.to_string(),
                });
            }
        }

        reports.sort_by(|a, b| b.date.cmp(&a.date));
        debug!("Found {} {} reports in {}", reports.len(), kind.key, self.dir.display());
        Ok(reports)
    }

    /// Regenerate every report array in the index file.
    ///
    /// The file is left untouched when any placeholder is missing.
    pub fn update(&self) -> Result<IndexSummary> {
        let mut content = fs::read_to_string(&self.index_file)
            .map_err(|_| Error::NotFound(format!("index file {}", self.index_file.display())))?;

        let mut counts = Vec::with_capacity(self.kinds.len());
        for kind in &self.kinds {
            let reports = self.scan(kind)?;
            content = replace_array(&content, &kind.key, &to_js_array(&reports))?;
            counts.push((kind.key.clone(), reports.len()));
        }

        write_atomic(&self.index_file, content.as_bytes())?;
        info!("Updated report index {}", self.index_file.display());

        Ok(IndexSummary {
            index_file: self.index_file.clone(),
            counts,
        })
    }
}

/// Render reports as a JavaScript array literal laid out for the index page.
pub fn to_js_array(reports: &[ReportFile]) -> String {
    let items: Vec<String> = reports
        .iter()
        .map(|r| format!("{{ date: \"{}\", file: \"{}\" }}", r.date, r.file))
        .collect();

    format!(
        "[\n{item}{}\n{close}]",
        items.join(&format!(",\n{}", ITEM_INDENT)),
        item = ITEM_INDENT,
        close = CLOSE_INDENT
    )
}

/// Replace every `<key>: [...]` span (shortest match, across lines) with
/// `<key>: <literal>`. The key must start at a word boundary.
pub fn replace_array(content: &str, key: &str, literal: &str) -> Result<String> {
    let pattern = Regex::new(&format!(r"(?s)\b{}: \[.*?\]", regex::escape(key)))?;

    if !pattern.is_match(content) {
        return Err(Error::MissingPlaceholder(format!("{}: [", key)));
    }

    let replacement = format!("{}: {}", key, literal);
    Ok(pattern.replace_all(content, NoExpand(&replacement)).into_owned())
}
