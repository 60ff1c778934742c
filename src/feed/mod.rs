pub mod fetcher;
pub mod normalizer;
pub mod parser;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Result;

/// A feed URL together with the category it was configured under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedAssignment {
    pub url: String,
    pub category: String,
}

/// Anything that can turn a feed URL into a parsed feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_feed(&self, url: &str) -> Result<ParsedFeed>;
}

#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub entries: Vec<RawEntry>,
}

impl ParsedFeed {
    /// Display name of the feed, falling back to the URL it was fetched from.
    pub fn source_name(&self, url: &str) -> String {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(url)
            .to_string()
    }
}

/// One entry of a feed before normalization.
///
/// Every field is optional; the accessors return `None` both when the feed
/// omitted the field and when it was present but blank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    title: Option<String>,
    link: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    published: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
}

impl RawEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_published(mut self, published: DateTime<Utc>) -> Self {
        self.published = Some(published);
        self
    }

    pub fn with_updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = Some(updated);
        self
    }

    pub fn title(&self) -> Option<&str> {
        non_blank(&self.title)
    }

    pub fn link(&self) -> Option<&str> {
        non_blank(&self.link).map(str::trim)
    }

    pub fn summary(&self) -> Option<&str> {
        non_blank(&self.summary)
    }

    pub fn description(&self) -> Option<&str> {
        non_blank(&self.description)
    }

    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.published
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub url: String,
    pub source: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub published: DateTime<Utc>,
    #[serde(skip)]
    pub category: String,
}

/// ISO-8601 with an explicit `+00:00` offset.
pub fn serialize_timestamp<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, false))
}
