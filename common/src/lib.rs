/*!
common/src/lib.rs

Shared configuration types and helpers for newsdesk.

This file provides:
- Config data structures (deserialized from TOML), every field defaulted
- An async loader that merges a default file with an override file
- Secret lookup from environment variables
- A helper to open an SQLite pool for the sqlite store backend
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// HTTP server section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Feed sources. The list is read once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    pub urls: Vec<String>,
}

/// Aggregation knobs: how many entries per feed and how many overall
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub items_per_feed: usize,
    pub max_articles: usize,
    pub fetch_timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            items_per_feed: 1,
            max_articles: 10,
            fetch_timeout_seconds: 20,
            user_agent: "newsdesk/0.1.0".to_string(),
        }
    }
}

/// Remote generation service (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub max_tokens: Option<usize>,
    pub update_temperature: f32,
    pub live_temperature: f32,
    // Prompt templates: inline text wins over a file path; both fall back to the built-in default
    pub update_prompt: Option<String>,
    pub update_prompt_file: Option<PathBuf>,
    pub live_prompt: Option<String>,
    pub live_prompt_file: Option<PathBuf>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-4o".to_string(),
            timeout_seconds: 60,
            max_tokens: None,
            update_temperature: 0.75,
            live_temperature: 0.7,
            update_prompt: None,
            update_prompt_file: None,
            live_prompt: None,
            live_prompt_file: None,
        }
    }
}

/// Key-value store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Sqlite,
    Rest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Cache slot holding the latest batch
    pub key: String,
    pub sqlite_path: String,
    /// Base URL of a Redis-over-HTTP service (Vercel KV / Upstash REST API)
    pub rest_url: Option<String>,
    pub token_env: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            key: "latest_news".to_string(),
            sqlite_path: "data/newsdesk.db".to_string(),
            rest_url: None,
            token_env: "KV_REST_API_TOKEN".to_string(),
        }
    }
}

/// Scheduled update cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub interval_minutes: u64,
    pub run_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 60,
            run_on_startup: true,
        }
    }
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub feeds: FeedsConfig,
    pub aggregator: AggregatorConfig,
    pub llm: LlmConfig,
    pub store: StoreConfig,
    pub scheduler: SchedulerConfig,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        for (path, label) in [(default_path, "default"), (override_path, "override")] {
            let Some(path) = path else { continue };
            if !path.exists() {
                continue;
            }
            let data = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {} config: {}", label, path.display()))?;
            let val: toml::Value = toml::from_str(&data)
                .with_context(|| format!("Failed to parse {} configuration", label))?;
            merge_toml(&mut config_value, val);
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

/// Read a secret from the environment variable named in configuration.
pub fn secret_from_env(var_name: &str) -> Result<String> {
    let value = std::env::var(var_name)
        .with_context(|| format!("environment variable '{}' not set", var_name))?;
    if value.trim().is_empty() {
        anyhow::bail!("environment variable '{}' is empty", var_name);
    }
    Ok(value)
}

/// Initialize an SQLite connection pool.
///
/// Creates the parent directory if necessary and the DB file if missing. The pool is small
/// because the only consumer is the key-value store, which touches one row per cycle.
pub async fn init_db_pool(path: &str) -> Result<SqlitePool> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create DB parent directory: {}", parent.display())
            })?;
        }
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to sqlite database at path: {}", path))?;

    Ok(pool)
}
