// Fetch the configured feeds once and print what the aggregator would pick.
use common::Config;
use newsdesk::ingestion::{self, FeedFetcher};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = Config::load_with_defaults(
        Some(Path::new("config.default.toml")),
        Some(Path::new("config.toml")),
    )
    .await?;
    let fetcher = FeedFetcher::new(&config.aggregator)?;

    for url in &config.feeds.urls {
        println!("\n{}", "=".repeat(60));
        println!("Testing: {}", url);
        println!("{}", "=".repeat(60));

        match fetcher.fetch_feed(url).await {
            Ok(feed) => {
                println!("✓ Success!");
                println!("  Title: {:?}", feed.title.as_ref().map(|t| &t.content));
                println!("  Entries: {}", feed.entries.len());
                for (i, a) in ingestion::newest_articles(url, &feed, 3).iter().enumerate() {
                    println!("    {}. {}", i + 1, a.title);
                    println!("       URL: {}", a.link);
                    println!("       Date: {:?}, Snippet: {} chars", a.pub_date, a.snippet.len());
                }
            }
            Err(e) => {
                println!("✗ Failed: {:#}", e);
            }
        }
    }

    let picked = ingestion::aggregate(&fetcher, &config.feeds.urls, &config.aggregator).await;
    println!("\n{}", "=".repeat(60));
    println!("Aggregated selection ({} articles)", picked.len());
    println!("{}", "=".repeat(60));
    for a in &picked {
        println!("  [{}] {} ({:?})", a.source, a.title, a.pub_date);
    }
    Ok(())
}
