// Rewriter: one generation request per article, all in flight at once
use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{info, warn};

use crate::llm::prompts::PromptTemplate;
use crate::llm::{extract_json_from_text, LlmProvider, LlmRequest};
use crate::models::{ProcessedArticle, RawArticle, RewrittenContent};

/// Parse a generation reply into rewritten content.
///
/// The reply must contain a JSON object; its keys and values are not checked. Fenced or
/// prose-wrapped objects are accepted.
pub fn parse_rewritten_content(reply: &str) -> Result<RewrittenContent> {
    if let Ok(content) = serde_json::from_str::<RewrittenContent>(reply.trim()) {
        return Ok(content);
    }

    let cleaned = extract_json_from_text(reply).context("no JSON object found in reply")?;
    serde_json::from_str(&cleaned)
        .with_context(|| format!("reply is not a valid JSON object: {}", cleaned))
}

/// Rewrite a single article. Any failure is returned to the caller.
pub async fn rewrite_article<P: LlmProvider + ?Sized>(
    provider: &P,
    template: &PromptTemplate,
    temperature: f32,
    article: RawArticle,
) -> Result<ProcessedArticle> {
    let request = LlmRequest {
        prompt: template.render(&article),
        temperature: Some(temperature),
        json_response: true,
        ..Default::default()
    };

    let response = provider.generate(request).await?;
    let ai_content = parse_rewritten_content(&response.content)?;

    Ok(ProcessedArticle {
        article,
        ai_content,
    })
}

/// Rewrite every article concurrently and wait for all of them. Failed articles are
/// logged and dropped; survivors keep their input order.
pub async fn rewrite_articles<P: LlmProvider + ?Sized>(
    provider: &P,
    template: &PromptTemplate,
    temperature: f32,
    articles: Vec<RawArticle>,
) -> Vec<ProcessedArticle> {
    let requested = articles.len();

    let pending = articles.into_iter().map(|article| async move {
        let title = article.title.clone();
        match rewrite_article(provider, template, temperature, article).await {
            Ok(processed) => Some(processed),
            Err(e) => {
                warn!(article = %title, error = %format!("{:#}", e), "rewrite failed, dropping article");
                None
            }
        }
    });

    let processed: Vec<ProcessedArticle> = join_all(pending).await.into_iter().flatten().collect();

    info!(
        requested,
        rewritten = processed.len(),
        "rewrite step complete"
    );
    processed
}
