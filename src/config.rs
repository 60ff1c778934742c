use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::feed::FeedAssignment;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub categories: CategoryMap,

    #[serde(default = "default_max_items", alias = "items_per_category")]
    pub max_items_per_category: usize,

    #[serde(default = "default_summary_max_length")]
    pub summary_max_length: usize,

    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_concurrent_fetches")]
    pub concurrent_fetches: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_keep_empty_categories")]
    pub keep_empty_categories: bool,
}

/// One configured category and the feed URLs listed under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub urls: Vec<String>,
}

/// Categories in the order they appear in the configuration file.
///
/// A JSON object is deserialized entry by entry so the file order survives;
/// a repeated key replaces the URL list of the earlier entry in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap(Vec<Category>);

impl CategoryMap {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, urls: Vec<String>) {
        let name = name.into();
        match self.0.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.urls = urls,
            None => self.0.push(Category { name, urls }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.iter().find(|c| c.name == name).map(|c| c.urls.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for CategoryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for category in &self.0 {
            map.serialize_entry(&category.name, &category.urls)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct CategoryMapVisitor;

        impl<'de> Visitor<'de> for CategoryMapVisitor {
            type Value = CategoryMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category names to lists of feed URLs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut categories = CategoryMap::new();
                while let Some((name, urls)) = access.next_entry::<String, Vec<String>>()? {
                    categories.insert(name, urls);
                }
                Ok(categories)
            }
        }

        deserializer.deserialize_map(CategoryMapVisitor)
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::NotFound(format!("configuration file {}", path.display()))
            }
            _ => Error::Io(e),
        })?;

        Self::parse(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.categories.iter().any(|c| c.name.trim().is_empty()) {
            return Err(Error::Invalid("Category name cannot be empty".to_string()));
        }

        if self.max_items_per_category == 0 {
            return Err(Error::Invalid("max_items_per_category must be greater than 0".to_string()));
        }

        if self.summary_max_length == 0 {
            return Err(Error::Invalid("summary_max_length must be greater than 0".to_string()));
        }

        if self.fetch_timeout_secs == 0 {
            return Err(Error::Invalid("fetch_timeout_secs must be greater than 0".to_string()));
        }

        if self.concurrent_fetches == 0 {
            return Err(Error::Invalid("concurrent_fetches must be greater than 0".to_string()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(max_items) = std::env::var("FEED_DIGEST_MAX_ITEMS") {
            if let Ok(val) = max_items.parse() {
                self.max_items_per_category = val;
            }
        }

        if let Ok(output) = std::env::var("FEED_DIGEST_OUTPUT") {
            if !output.is_empty() {
                self.output_path = PathBuf::from(output);
            }
        }

        if let Ok(timeout) = std::env::var("FEED_DIGEST_TIMEOUT") {
            if let Ok(val) = timeout.parse() {
                self.fetch_timeout_secs = val;
            }
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Resolve every configured URL to exactly one category.
    ///
    /// A URL listed under several categories belongs to the last one that
    /// lists it, but keeps the fetch position of its first appearance.
    pub fn feed_assignments(&self) -> Vec<FeedAssignment> {
        let mut assignments: Vec<FeedAssignment> = Vec::new();

        for category in self.categories.iter() {
            for url in &category.urls {
                match assignments.iter_mut().find(|a| &a.url == url) {
                    Some(existing) => existing.category = category.name.clone(),
                    None => assignments.push(FeedAssignment {
                        url: url.clone(),
                        category: category.name.clone(),
                    }),
                }
            }
        }

        assignments
    }
}

fn default_max_items() -> usize { 25 }
fn default_summary_max_length() -> usize { 300 }
fn default_output_path() -> PathBuf { PathBuf::from("data/feed.json") }
fn default_fetch_timeout() -> u64 { 30 }
fn default_concurrent_fetches() -> usize { 1 }
fn default_user_agent() -> String {
    format!("feed-digest/{}", env!("CARGO_PKG_VERSION"))
}
fn default_keep_empty_categories() -> bool { true }

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "categories": {
            "tech": ["https://a.example.com/rss", "https://b.example.com/rss"],
            "music": ["https://c.example.com/rss", "https://a.example.com/rss"],
            "art": []
        },
        "max_items_per_category": 10
    }"#;

    #[test]
    fn test_parse_keeps_category_order() {
        let config = Config::parse(SAMPLE).unwrap();

        let names: Vec<&str> = config.categories.names().collect();
        assert_eq!(names, vec!["tech", "music", "art"]);
        assert_eq!(config.max_items_per_category, 10);
        assert_eq!(config.categories.get("art"), Some(&[][..]));
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse(r#"{"categories": {}}"#).unwrap();

        assert_eq!(config.max_items_per_category, 25);
        assert_eq!(config.summary_max_length, 300);
        assert_eq!(config.output_path, PathBuf::from("data/feed.json"));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.concurrent_fetches, 1);
        assert!(config.keep_empty_categories);
        assert!(config.user_agent.starts_with("feed-digest/"));
    }

    #[test]
    fn test_items_per_category_alias() {
        let config = Config::parse(r#"{"categories": {}, "items_per_category": 4}"#).unwrap();
        assert_eq!(config.max_items_per_category, 4);
    }

    #[test]
    fn test_last_assignment_wins() {
        let config = Config::parse(SAMPLE).unwrap();
        let assignments = config.feed_assignments();

        assert_eq!(assignments.len(), 3);
        assert_eq!(assignments[0].url, "https://a.example.com/rss");
        assert_eq!(assignments[0].category, "music");
        assert_eq!(assignments[1].category, "tech");
        assert_eq!(assignments[2].url, "https://c.example.com/rss");
        assert_eq!(assignments[2].category, "music");
    }

    #[test]
    fn test_duplicate_category_key_replaces_urls() {
        let config = Config::parse(
            r#"{"categories": {"tech": ["https://old.example.com"], "news": [], "tech": ["https://new.example.com"]}}"#,
        )
        .unwrap();

        let names: Vec<&str> = config.categories.names().collect();
        assert_eq!(names, vec!["tech", "news"]);
        assert_eq!(
            config.categories.get("tech"),
            Some(&["https://new.example.com".to_string()][..])
        );
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(Config::parse("not json"), Err(Error::Config(_))));
        assert!(matches!(Config::parse(r#"{"max_items_per_category": 3}"#), Err(Error::Config(_))));
        assert!(matches!(
            Config::parse(r#"{"categories": {}, "max_items_per_category": 0}"#),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            Config::parse(r#"{"categories": {" ": []}}"#),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            Config::parse(r#"{"categories": {"tech": "https://a.example.com"}}"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/feed-digest/config.json");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_load_unreadable_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let binary = dir.path().join("config.json");
        std::fs::write(&binary, [0xff, 0xfe, 0x00, 0x7b]).unwrap();

        assert!(matches!(Config::load(&binary), Err(Error::Io(_))));
        assert!(matches!(Config::load(dir.path()), Err(Error::Io(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.categories.len(), 3);
    }

    #[test]
    fn test_serialize_round_trips_order() {
        let config = Config::parse(SAMPLE).unwrap();
        let json = serde_json::to_string(&config).unwrap();

        let tech = json.find("\"tech\"").unwrap();
        let music = json.find("\"music\"").unwrap();
        let art = json.find("\"art\"").unwrap();
        assert!(tech < music && music < art);
    }
}
