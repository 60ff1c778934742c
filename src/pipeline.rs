//! One aggregation run: fetch every configured feed, normalize its entries,
//! rank them per category and write the snapshot.

use futures::StreamExt;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::digest::{Ranker, Snapshot, SnapshotWriter};
use crate::error::{Error, Result};
use crate::feed::fetcher::fetch_all;
use crate::feed::normalizer::Normalizer;
use crate::feed::{Article, FeedSource};

/// Counters collected while building a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub feeds_configured: usize,
    pub feeds_fetched: usize,
    pub feeds_failed: usize,
    pub entries_seen: usize,
    pub entries_skipped: usize,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stats: RunStats,
    pub articles_written: usize,
    pub categories_written: usize,
    pub output_path: PathBuf,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Saved {} articles in {} categories to {}",
            self.articles_written,
            self.categories_written,
            self.output_path.display()
        )
    }
}

pub struct Pipeline<S> {
    source: S,
    config: Config,
}

impl<S: FeedSource> Pipeline<S> {
    pub fn new(source: S, config: Config) -> Self {
        Self { source, config }
    }

    /// Fetch and rank without touching the filesystem.
    ///
    /// Fails with [`Error::NoFeeds`] when not a single feed could be fetched.
    pub async fn build_snapshot(&self) -> Result<(Snapshot, RunStats)> {
        let normalizer = Normalizer::new(self.config.summary_max_length)?;
        let assignments = self.config.feed_assignments();

        let mut stats = RunStats {
            feeds_configured: assignments.len(),
            ..Default::default()
        };
        let mut articles: Vec<Article> = Vec::new();

        let results = fetch_all(&self.source, &assignments, self.config.concurrent_fetches);
        futures::pin_mut!(results);

        while let Some((assignment, result)) = results.next().await {
            let feed = match result {
                Ok(feed) => feed,
                Err(e) => {
                    warn!(
                        url = %assignment.url,
                        category = %assignment.category,
                        code = e.error_code(),
                        "Skipping feed: {}", e
                    );
                    stats.feeds_failed += 1;
                    continue;
                }
            };

            stats.feeds_fetched += 1;
            let source = feed.source_name(&assignment.url);
            let before = articles.len();

            for entry in &feed.entries {
                stats.entries_seen += 1;
                match normalizer.normalize(entry, &source, &assignment.category) {
                    Some(article) => articles.push(article),
                    None => {
                        stats.entries_skipped += 1;
                        debug!(url = %assignment.url, "Dropping entry without link");
                    }
                }
            }

            info!(
                url = %assignment.url,
                category = %assignment.category,
                "Fetched {} articles from {}", articles.len() - before, source
            );
        }

        if stats.feeds_fetched == 0 {
            return Err(Error::NoFeeds(stats.feeds_configured));
        }

        let categories = Ranker::new(self.config.max_items_per_category)
            .keep_empty(self.config.keep_empty_categories)
            .rank(self.config.categories.names(), articles);

        Ok((Snapshot::new(categories), stats))
    }

    /// Build the snapshot and write it to the configured output path.
    pub async fn run(&self) -> Result<RunSummary> {
        let (snapshot, stats) = self.build_snapshot().await?;

        if stats.feeds_failed > 0 {
            warn!(
                "{} of {} feeds could not be fetched",
                stats.feeds_failed, stats.feeds_configured
            );
        }

        let writer = SnapshotWriter::new(&self.config.output_path);
        let output_path = writer.write(&snapshot)?.to_path_buf();

        Ok(RunSummary {
            stats,
            articles_written: snapshot.categories.article_count(),
            categories_written: snapshot.categories.len(),
            output_path,
        })
    }
}
