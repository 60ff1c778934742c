use crate::feed::{ParsedFeed, RawEntry};
use crate::error::{Error, Result};
use feed_rs::model::Link;
use feed_rs::parser as feed_parser;
use std::io::Read;

pub struct FeedParser;

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_feed<R: Read>(&self, reader: R) -> Result<ParsedFeed> {
        let feed = feed_parser::parse(reader)
            .map_err(|e| Error::FeedParse(format!("Failed to parse feed: {}", e)))?;

        let title = feed.title.map(|t| t.content);

        let entries = feed
            .entries
            .into_iter()
            .map(|entry| {
                let mut raw = RawEntry::new();

                if let Some(title) = entry.title {
                    raw = raw.with_title(title.content);
                }
                if let Some(link) = primary_link(&entry.links).or_else(|| permalink(&entry.id)) {
                    raw = raw.with_link(link);
                }
                // RSS <description> and Atom <summary> both land in `summary`;
                // the content body stands in as the description.
                if let Some(summary) = entry.summary {
                    raw = raw.with_summary(summary.content);
                }
                if let Some(body) = entry.content.and_then(|c| c.body) {
                    raw = raw.with_description(body);
                }
                if let Some(published) = entry.published {
                    raw = raw.with_published(published);
                }
                if let Some(updated) = entry.updated {
                    raw = raw.with_updated(updated);
                }

                raw
            })
            .collect();

        Ok(ParsedFeed { title, entries })
    }

    pub fn validate_feed_url(&self, url: &str) -> Result<()> {
        let parsed_url = url::Url::parse(url)
            .map_err(|e| Error::InvalidUrl(format!("Invalid URL {}: {}", url, e)))?;

        match parsed_url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(Error::InvalidUrl(format!("Unsupported scheme: {}", scheme))),
        }
    }
}

/// The alternate link if one is marked, otherwise the first link.
fn primary_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
}

/// An RSS `<guid>` that is itself a web address doubles as the item link.
fn permalink(id: &str) -> Option<String> {
    let id = id.trim();
    let url = url::Url::parse(id).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Cursor;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
    <channel>
        <title>Test RSS Feed</title>
        <description>A test RSS feed for unit testing</description>
        <link>https://example.com</link>
        <item>
            <title>First Article</title>
            <link>https://example.com/first</link>
            <description>This is the &lt;b&gt;first&lt;/b&gt; test article</description>
            <pubDate>Fri, 15 Mar 2024 09:00:00 GMT</pubDate>
            <guid>https://example.com/first</guid>
        </item>
        <item>
            <title>Second Article</title>
            <description>No link on this one</description>
            <pubDate>Fri, 15 Mar 2024 08:00:00 GMT</pubDate>
        </item>
    </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>Test Atom Feed</title>
    <link rel="self" href="https://example.com/feed.xml"/>
    <link href="https://example.com"/>
    <updated>2024-03-15T10:00:00Z</updated>
    <id>https://example.com/feed</id>
    <entry>
        <title>Atom Article One</title>
        <link rel="alternate" href="https://example.com/atom1"/>
        <id>https://example.com/atom1</id>
        <updated>2024-03-15T09:30:00Z</updated>
        <content type="html">&lt;p&gt;Full content&lt;/p&gt;</content>
    </entry>
</feed>"#;

    const MALFORMED_XML: &str = r#"<?xml version="1.0"?>
<rss version="2.0">
    <channel>
        <title>Broken Feed</title>
        <item>
            <title>Unclosed tag
            <link>https://example.com/broken</link>
        </item>
    </channel>
    <!-- Missing closing rss tag -->"#;

    #[test]
    fn test_parse_rss_feed() {
        let parser = FeedParser::new();
        let result = parser.parse_feed(Cursor::new(RSS_SAMPLE.as_bytes())).unwrap();

        assert_eq!(result.title.as_deref(), Some("Test RSS Feed"));
        assert_eq!(result.entries.len(), 2);

        let first = &result.entries[0];
        assert_eq!(first.title(), Some("First Article"));
        assert_eq!(first.link(), Some("https://example.com/first"));
        assert_eq!(first.summary(), Some("This is the <b>first</b> test article"));
        assert_eq!(
            first.published(),
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap())
        );

        assert_eq!(result.entries[1].link(), None);
    }

    #[test]
    fn test_parse_atom_feed() {
        let parser = FeedParser::new();
        let result = parser.parse_feed(Cursor::new(ATOM_SAMPLE.as_bytes())).unwrap();

        assert_eq!(result.title.as_deref(), Some("Test Atom Feed"));
        assert_eq!(result.entries.len(), 1);

        let entry = &result.entries[0];
        assert_eq!(entry.link(), Some("https://example.com/atom1"));
        assert_eq!(entry.description(), Some("<p>Full content</p>"));
        assert_eq!(
            entry.updated(),
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_malformed_xml() {
        let parser = FeedParser::new();
        let result = parser.parse_feed(Cursor::new(MALFORMED_XML.as_bytes()));

        match result {
            Err(Error::FeedParse(msg)) => assert!(msg.contains("Failed to parse feed")),
            other => panic!("Expected FeedParse error, got {:?}", other.map(|f| f.title)),
        }
    }

    #[test]
    fn test_untitled_feed() {
        let parser = FeedParser::new();
        let no_title_feed = r#"<?xml version="1.0"?>
<rss version="2.0">
    <channel>
        <item>
            <link>https://example.com/notitle</link>
        </item>
    </channel>
</rss>"#;

        let result = parser.parse_feed(Cursor::new(no_title_feed.as_bytes())).unwrap();
        assert_eq!(result.source_name("https://example.com/rss"), "https://example.com/rss");
        assert_eq!(result.entries[0].title(), None);
    }

    #[test]
    fn test_primary_link_prefers_alternate() {
        let parser = FeedParser::new();
        let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>Links</title>
    <id>https://example.com/feed</id>
    <updated>2024-03-15T10:00:00Z</updated>
    <entry>
        <title>Self first</title>
        <id>urn:uuid:1</id>
        <link rel="self" href="https://example.com/entries/1.xml"/>
        <link rel="alternate" href="https://example.com/posts/1"/>
        <updated>2024-03-15T09:00:00Z</updated>
    </entry>
</feed>"#;

        let result = parser.parse_feed(Cursor::new(feed.as_bytes())).unwrap();
        assert_eq!(result.entries[0].link(), Some("https://example.com/posts/1"));
    }

    #[test]
    fn test_guid_stands_in_for_missing_link() {
        let parser = FeedParser::new();
        let guid_only = r#"<?xml version="1.0"?>
<rss version="2.0">
    <channel>
        <title>Guid Feed</title>
        <item>
            <title>Marked permalink</title>
            <guid isPermaLink="true">https://g.example.com/post/1</guid>
        </item>
        <item>
            <title>Default permalink</title>
            <guid>https://g.example.com/post/2</guid>
        </item>
        <item>
            <title>Opaque guid</title>
            <guid isPermaLink="false">tag:g.example.com,2024:3</guid>
        </item>
        <item>
            <title>Link wins</title>
            <link>https://g.example.com/real/4</link>
            <guid>https://g.example.com/post/4</guid>
        </item>
    </channel>
</rss>"#;

        let result = parser.parse_feed(Cursor::new(guid_only.as_bytes())).unwrap();
        let links: Vec<Option<&str>> = result.entries.iter().map(|e| e.link()).collect();

        assert_eq!(
            links,
            vec![
                Some("https://g.example.com/post/1"),
                Some("https://g.example.com/post/2"),
                None,
                Some("https://g.example.com/real/4"),
            ]
        );
    }

    #[test]
    fn test_validate_feed_url() {
        let parser = FeedParser::new();

        assert!(parser.validate_feed_url("https://example.com/feed.xml").is_ok());
        assert!(parser.validate_feed_url("http://example.com/rss").is_ok());

        assert!(parser.validate_feed_url("not-a-url").is_err());
        assert!(parser.validate_feed_url("ftp://example.com/feed").is_err());
        assert!(parser.validate_feed_url("file:///local/feed.xml").is_err());
        assert!(parser.validate_feed_url("").is_err());
    }
}
