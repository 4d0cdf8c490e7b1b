// Send one sample article through the rewrite prompt and print the parsed result.
use common::Config;
use newsdesk::llm::prompts::{PromptTemplate, DEFAULT_UPDATE_PROMPT};
use newsdesk::llm::remote::RemoteLlmProvider;
use newsdesk::models::RawArticle;
use newsdesk::rewriting;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();
    dotenv::dotenv().ok();

    let config = Config::load_with_defaults(
        Some(Path::new("config.default.toml")),
        Some(Path::new("config.toml")),
    )
    .await?;
    let provider = RemoteLlmProvider::from_config(&config.llm)?;
    let template = PromptTemplate::resolve(
        config.llm.update_prompt.as_deref(),
        config.llm.update_prompt_file.as_deref(),
        DEFAULT_UPDATE_PROMPT,
    )?;

    println!("\n{}", "=".repeat(60));
    println!("Testing LLM Provider");
    println!("Base URL: {}", config.llm.api_url);
    println!("Model: {}", provider.model());
    println!("{}", "=".repeat(60));

    let article = RawArticle {
        source: "Sample".to_string(),
        title: "Central bank holds interest rate for the third consecutive meeting".to_string(),
        link: "https://example.com/rates".to_string(),
        pub_date: None,
        snippet: "The monetary policy committee kept the benchmark rate unchanged, citing \
                  persistent inflation in services and uncertainty over the fiscal outlook."
            .to_string(),
    };

    match rewriting::rewrite_article(&provider, &template, config.llm.update_temperature, article).await {
        Ok(processed) => {
            println!("✓ Success!");
            println!("{}", serde_json::to_string_pretty(&processed.ai_content)?);
        }
        Err(e) => {
            eprintln!("✗ Failed: {:#}", e);
        }
    }
    Ok(())
}
