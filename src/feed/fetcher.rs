use crate::config::Config;
use crate::error::{Error, Result};
use crate::feed::parser::FeedParser;
use crate::feed::{FeedAssignment, FeedSource, ParsedFeed};
use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone)]
pub struct FeedFetcher {
    client: Client,
    timeout_duration: Duration,
}

impl FeedFetcher {
    pub fn new() -> Result<Self> {
        Self::with_settings(DEFAULT_TIMEOUT, &format!("feed-digest/{}", env!("CARGO_PKG_VERSION")))
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_settings(config.fetch_timeout(), &config.user_agent)
    }

    /// `timeout` bounds the whole exchange, body download included.
    pub fn with_settings(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(user_agent)
            .gzip(true)
            .build()
            .map_err(|e| Error::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout_duration: timeout,
        })
    }

    async fn fetch_response(&self, url: &str) -> Result<Response> {
        self.client
            .get(url)
            .header("Accept", "application/rss+xml, application/atom+xml, application/xml, text/xml, */*")
            .send()
            .await
            .map_err(|e| request_error(url, e))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.fetch_response(url).await?;

        if !response.status().is_success() {
            return Err(Error::HttpError(format!(
                "HTTP {} for {}: {}",
                response.status().as_u16(),
                url,
                response.status().canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let content = response
            .bytes()
            .await
            .map_err(|e| request_error(url, e))?;

        Ok(content.to_vec())
    }
}

#[async_trait]
impl FeedSource for FeedFetcher {
    async fn fetch_feed(&self, url: &str) -> Result<ParsedFeed> {
        debug!("Fetching feed from: {}", url);

        let parser = FeedParser::new();
        parser.validate_feed_url(url)?;

        let content = timeout(self.timeout_duration, self.download(url))
            .await
            .map_err(|_| Error::Timeout(format!("Request to {} timed out", url)))??;

        debug!("Downloaded {} bytes from {}", content.len(), url);

        parser.parse_feed(std::io::Cursor::new(content))
    }
}

fn request_error(url: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout(format!("Request to {} timed out", url))
    } else {
        Error::HttpError(format!("Request to {} failed: {}", url, err))
    }
}

/// Lazily fetch every assigned feed, yielding results in assignment order.
///
/// At most `concurrency` requests are in flight; with `concurrency == 1` the
/// feeds are fetched strictly one after another.
pub fn fetch_all<'a, S>(
    source: &'a S,
    assignments: &'a [FeedAssignment],
    concurrency: usize,
) -> impl Stream<Item = (&'a FeedAssignment, Result<ParsedFeed>)> + 'a
where
    S: FeedSource + ?Sized,
{
    stream::iter(assignments)
        .map(move |assignment| async move {
            let result = source.fetch_feed(&assignment.url).await;
            (assignment, result)
        })
        .buffered(concurrency.max(1))
}
