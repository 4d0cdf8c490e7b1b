use anyhow::{Context, Result};
use common::{StoreBackend, StoreConfig};
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::ProcessedArticle;

pub mod memory;
pub mod rest;
pub mod sqlite;

pub use memory::MemoryStore;
pub use rest::RestStore;
pub use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("unexpected store response: {0}")]
    UnexpectedResponse(String),

    #[error("invalid store URL: {0}")]
    InvalidUrl(String),
}

/// Minimal key-value contract: one value per key, overwritten on set.
#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    /// Backend name, used in logs
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError>;
}

/// Replace the batch stored under `key`.
pub async fn write_batch(
    store: &dyn KvStore,
    key: &str,
    articles: &[ProcessedArticle],
) -> Result<()> {
    let payload = serde_json::to_string(articles).context("failed to serialize batch")?;
    store
        .set(key, &payload)
        .await
        .with_context(|| format!("failed to write '{}' to {} store", key, store.name()))?;
    debug!(key, bytes = payload.len(), count = articles.len(), "batch written");
    Ok(())
}

/// Read the batch stored under `key`; an absent key is an empty batch.
pub async fn read_batch(store: &dyn KvStore, key: &str) -> Result<Vec<ProcessedArticle>> {
    let raw = store
        .get(key)
        .await
        .with_context(|| format!("failed to read '{}' from {} store", key, store.name()))?;

    match raw {
        Some(payload) => serde_json::from_str(&payload)
            .with_context(|| format!("stored value under '{}' is not a valid batch", key)),
        None => Ok(Vec::new()),
    }
}

/// Build the configured backend.
pub async fn build_store(config: &StoreConfig) -> Result<Arc<dyn KvStore>> {
    let store: Arc<dyn KvStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Sqlite => {
            let store = SqliteStore::connect(&config.sqlite_path).await?;
            Arc::new(store)
        }
        StoreBackend::Rest => {
            let url = config
                .rest_url
                .as_deref()
                .context("store.backend = \"rest\" requires store.rest_url")?;
            let token = common::secret_from_env(&config.token_env)
                .context("REST store token is not configured")?;
            Arc::new(RestStore::new(url, token)?)
        }
    };
    info!(backend = store.name(), key = %config.key, "key-value store ready");
    Ok(store)
}
