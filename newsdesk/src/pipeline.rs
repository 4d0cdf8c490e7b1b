use anyhow::{Context, Result};
use common::{AggregatorConfig, Config};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::ingestion::{self, FeedFetcher};
use crate::llm::prompts::{PromptTemplate, DEFAULT_LIVE_PROMPT, DEFAULT_UPDATE_PROMPT};
use crate::llm::remote::RemoteLlmProvider;
use crate::llm::LlmProvider;
use crate::models::ProcessedArticle;
use crate::rewriting;
use crate::store::{self, KvStore};

/// Everything an update cycle needs, built once at startup and shared by the server
/// and the worker.
pub struct AppContext {
    pub feeds: Vec<String>,
    pub aggregator: AggregatorConfig,
    pub fetcher: FeedFetcher,
    pub llm: Arc<dyn LlmProvider>,
    pub store: Arc<dyn KvStore>,
    pub store_key: String,
    pub update_prompt: PromptTemplate,
    pub update_temperature: f32,
    pub live_prompt: PromptTemplate,
    pub live_temperature: f32,
}

/// Result of one update cycle, also the body of a successful update response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub articles_updated: usize,
}

impl AppContext {
    /// Assemble a context from explicit parts and the configuration's tuning values.
    pub fn new(
        config: &Config,
        llm: Arc<dyn LlmProvider>,
        store: Arc<dyn KvStore>,
    ) -> Result<Self> {
        let llm_cfg = &config.llm;
        let update_prompt = PromptTemplate::resolve(
            llm_cfg.update_prompt.as_deref(),
            llm_cfg.update_prompt_file.as_deref(),
            DEFAULT_UPDATE_PROMPT,
        )?;
        let live_prompt = PromptTemplate::resolve(
            llm_cfg.live_prompt.as_deref(),
            llm_cfg.live_prompt_file.as_deref(),
            DEFAULT_LIVE_PROMPT,
        )?;
        for (name, template) in [("update", &update_prompt), ("live", &live_prompt)] {
            if !template.has_placeholders() {
                warn!(template = name, "prompt template has no {{title}} or {{snippet}} placeholder");
            }
        }

        if config.feeds.urls.is_empty() {
            warn!("no feeds configured; update cycles will store empty batches");
        }

        Ok(Self {
            feeds: config.feeds.urls.clone(),
            aggregator: config.aggregator.clone(),
            fetcher: FeedFetcher::new(&config.aggregator)?,
            llm,
            store,
            store_key: config.store.key.clone(),
            update_prompt,
            update_temperature: llm_cfg.update_temperature,
            live_prompt,
            live_temperature: llm_cfg.live_temperature,
        })
    }

    /// Build the remote LLM provider and the configured store, then assemble the context.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let provider = RemoteLlmProvider::from_config(&config.llm)?;
        info!(model = provider.model(), api_url = %config.llm.api_url, "LLM provider initialized");
        let store = store::build_store(&config.store).await?;
        Self::new(config, Arc::new(provider), store)
    }
}

/// Aggregate, rewrite with the update template, and overwrite the cache slot.
///
/// Only a store failure fails the cycle. A cycle with no surviving articles still
/// replaces the slot with an empty batch.
pub async fn run_update(ctx: &AppContext) -> Result<UpdateOutcome> {
    let raw = ingestion::aggregate(&ctx.fetcher, &ctx.feeds, &ctx.aggregator).await;
    let processed = rewriting::rewrite_articles(
        ctx.llm.as_ref(),
        &ctx.update_prompt,
        ctx.update_temperature,
        raw,
    )
    .await;

    store::write_batch(ctx.store.as_ref(), &ctx.store_key, &processed)
        .await
        .context("failed to save the processed batch")?;

    info!(
        articles = processed.len(),
        key = %ctx.store_key,
        "news updated successfully"
    );
    Ok(UpdateOutcome {
        articles_updated: processed.len(),
    })
}

/// Aggregate and rewrite with the live template without touching the cache.
pub async fn run_live(ctx: &AppContext) -> Vec<ProcessedArticle> {
    let raw = ingestion::aggregate(&ctx.fetcher, &ctx.feeds, &ctx.aggregator).await;
    rewriting::rewrite_articles(ctx.llm.as_ref(), &ctx.live_prompt, ctx.live_temperature, raw).await
}

/// Read the cached batch (empty when nothing has been stored yet).
pub async fn latest_news(ctx: &AppContext) -> Result<Vec<ProcessedArticle>> {
    store::read_batch(ctx.store.as_ref(), &ctx.store_key).await
}
