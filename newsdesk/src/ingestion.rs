use anyhow::{Context, Result};
use common::AggregatorConfig;
use feed_rs::model::{Entry, Feed};
use feed_rs::parser;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::RawArticle;

/// HTTP fetcher for feed documents. Holds one client configured with the fetch timeout.
#[derive(Clone)]
pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    pub fn new(config: &AggregatorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self { client })
    }

    /// Fetches a feed from the given URL and parses it. No retry: a failure is final
    /// for this cycle.
    pub async fn fetch_feed(&self, url: &str) -> Result<Feed> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("network error during fetch")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("feed fetch failed with status: {}", status);
        }

        let bytes = response.bytes().await.context("failed to read response body")?;
        parse_feed(bytes.as_ref())
    }
}

/// Parse RSS 2.0, RSS 1.0 or Atom bytes.
pub fn parse_feed(bytes: &[u8]) -> Result<Feed> {
    parser::parse(bytes).context("failed to parse feed")
}

/// Pick the newest `limit` entries of one feed. Undated entries come after dated ones
/// and keep their document order.
pub fn newest_articles(feed_url: &str, feed: &Feed, limit: usize) -> Vec<RawArticle> {
    let source = feed
        .title
        .as_ref()
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| feed_url.to_string());

    let mut articles: Vec<RawArticle> = feed
        .entries
        .iter()
        .map(|entry| to_raw_article(&source, entry))
        .collect();
    sort_newest_first(&mut articles);
    articles.truncate(limit);
    articles
}

fn to_raw_article(source: &str, entry: &Entry) -> RawArticle {
    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.trim().to_string())
        .unwrap_or_default();
    // Atom entries may list self/edit/replies links before the article link
    let link = entry
        .links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| entry.links.first())
        .map(|l| l.href.clone())
        .unwrap_or_default();

    // Summary first; fall back to the full content body
    let raw_snippet = entry
        .summary
        .as_ref()
        .map(|s| s.content.clone())
        .filter(|s| !s.trim().is_empty())
        .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
        .unwrap_or_default();

    RawArticle {
        source: source.to_string(),
        title,
        link,
        pub_date: entry.published.or(entry.updated),
        snippet: plain_text(&raw_snippet),
    }
}

/// Strip markup and collapse whitespace.
pub fn plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Stable sort, newest first; articles without a date sort as oldest.
pub fn sort_newest_first(articles: &mut [RawArticle]) {
    // Option orders None below Some, so reversing puts undated entries last
    articles.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
}

/// Fetch every configured feed in order, keep the newest entries of each, then merge,
/// sort and truncate. Feeds that fail are logged and skipped.
pub async fn aggregate(
    fetcher: &FeedFetcher,
    feed_urls: &[String],
    config: &AggregatorConfig,
) -> Vec<RawArticle> {
    let mut articles = Vec::new();

    for url in feed_urls {
        match fetcher.fetch_feed(url).await {
            Ok(feed) => {
                let picked = newest_articles(url, &feed, config.items_per_feed);
                debug!(feed = %url, entries = feed.entries.len(), picked = picked.len(), "feed fetched");
                articles.extend(picked);
            }
            Err(e) => {
                warn!(feed = %url, error = %format!("{:#}", e), "failed to fetch feed, skipping");
            }
        }
    }

    sort_newest_first(&mut articles);
    articles.truncate(config.max_articles);
    info!(
        feeds = feed_urls.len(),
        articles = articles.len(),
        "aggregation complete"
    );
    articles
}
