use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One feed entry, as picked by the aggregator.
///
/// `pub_date` is `None` when the entry carried no parseable publish or update date;
/// such articles sort after every dated article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    /// Feed title, or the feed URL when the feed has none
    pub source: String,
    pub title: String,
    pub link: String,
    pub pub_date: Option<DateTime<Utc>>,
    /// Plain-text summary of the entry
    pub snippet: String,
}

/// Editorialized version of an article as returned by the generation service.
///
/// Stored exactly as the model produced it: any JSON object is accepted and kept
/// key-for-key. The prompt asks for `novo_titulo`, `paragrafo_principal`,
/// `pontos_chave` and `analise`; the accessors below read those keys when they have
/// the expected type and return nothing otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewrittenContent(Map<String, Value>);

impl RewrittenContent {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn novo_titulo(&self) -> Option<&str> {
        self.text("novo_titulo")
    }

    pub fn paragrafo_principal(&self) -> Option<&str> {
        self.text("paragrafo_principal")
    }

    pub fn analise(&self) -> Option<&str> {
        self.text("analise")
    }

    /// String items of `pontos_chave`; empty when the key is missing or not a list.
    pub fn pontos_chave(&self) -> Vec<&str> {
        self.0
            .get("pontos_chave")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

impl From<Map<String, Value>> for RewrittenContent {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// A raw article with its rewritten content attached. Serializes flat, with the
/// rewrite under `aiContent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedArticle {
    #[serde(flatten)]
    pub article: RawArticle,
    pub ai_content: RewrittenContent,
}
