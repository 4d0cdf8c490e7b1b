// Shared fixtures for integration tests: feed documents, chat completion replies,
// and contexts wired to mock servers.
#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use common::Config;
use newsdesk::llm::remote::RemoteLlmProvider;
use newsdesk::pipeline::AppContext;
use newsdesk::store::{KvStore, StoreError};
use std::sync::Arc;

/// RSS 2.0 document; each item is (title, day of January 2024, hour).
pub fn rss_feed(title: &str, items: &[(&str, u32, u32)]) -> String {
    let mut xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\"><channel>\
         <title>{title}</title><link>https://example.com</link><description>test</description>"
    );
    for (item_title, day, hour) in items {
        let date = Utc
            .with_ymd_and_hms(2024, 1, *day, *hour, 0, 0)
            .unwrap()
            .to_rfc2822();
        let slug = item_title.replace(' ', "-").to_lowercase();
        xml.push_str(&format!(
            "<item><title>{item_title}</title><link>https://example.com/{slug}</link>\
             <pubDate>{date}</pubDate><description>About {slug}</description></item>"
        ));
    }
    xml.push_str("</channel></rss>");
    xml
}

/// OpenAI-style chat completion body whose message content is `content`.
pub fn chat_reply(content: &str) -> String {
    serde_json::json!({
        "model": "gpt-4o",
        "choices": [{
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 100, "completion_tokens": 50, "total_tokens": 150 }
    })
    .to_string()
}

/// A well-formed rewrite for an article title.
pub fn rewrite_json(title: &str) -> String {
    serde_json::json!({
        "novo_titulo": format!("Rewritten: {title}"),
        "paragrafo_principal": "Lead paragraph.",
        "pontos_chave": ["fact one", "fact two", "fact three"],
        "analise": "Analysis paragraph."
    })
    .to_string()
}

pub fn test_config(feed_urls: Vec<String>) -> Config {
    let mut config = Config::default();
    config.feeds.urls = feed_urls;
    config.aggregator.fetch_timeout_seconds = 5;
    config.llm.timeout_seconds = 5;
    config
}

pub fn context(config: &Config, llm_url: &str, store: Arc<dyn KvStore>) -> AppContext {
    let provider = RemoteLlmProvider::new(llm_url, "test-key", "gpt-4o").with_defaults(5, None, 0.75);
    AppContext::new(config, Arc::new(provider), store).expect("build context")
}

/// Store whose every call fails.
pub struct BrokenStore;

#[async_trait::async_trait]
impl KvStore for BrokenStore {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::UnexpectedResponse("store is down".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::UnexpectedResponse("store is down".to_string()))
    }
}
