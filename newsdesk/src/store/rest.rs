use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{KvStore, StoreError};

/// Redis-over-HTTP store speaking the Vercel KV / Upstash REST protocol:
/// `GET {base}/get/{key}` and `POST {base}/set/{key}` with the value as the raw body,
/// both answering `{"result": ...}`.
pub struct RestStore {
    base_url: Url,
    token: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RestReply {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

impl RestStore {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(base_url.to_string()).into());
        }
        Ok(Self {
            base_url,
            token: token.into(),
            client: reqwest::Client::new(),
        })
    }

    fn command_url(&self, command: &str, key: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(command)
            .push(key);
        Ok(url)
    }

    async fn reply(response: reqwest::Response) -> Result<RestReply, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Service {
                status: status.as_u16(),
                body,
            });
        }
        let reply: RestReply = response.json().await?;
        if let Some(error) = reply.error {
            return Err(StoreError::UnexpectedResponse(error));
        }
        Ok(reply)
    }
}

#[async_trait::async_trait]
impl KvStore for RestStore {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let url = self.command_url("get", key)?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        match Self::reply(response).await?.result {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            // Some clients store JSON values unencoded; hand them back as text
            other => Ok(Some(other.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let url = self.command_url("set", key)?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .body(value.to_string())
            .send()
            .await?;

        match Self::reply(response).await?.result {
            Value::String(s) if s == "OK" => Ok(()),
            other => Err(StoreError::UnexpectedResponse(other.to_string())),
        }
    }
}
