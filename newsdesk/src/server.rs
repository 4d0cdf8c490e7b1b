use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use common::ServerConfig;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{delete, get, options, patch, post, put, routes, Build, Rocket, State};
use serde_json::{json, Value};

use crate::models::ProcessedArticle;
use crate::pipeline::{self, AppContext};

/// Application state stored inside Rocket managed state.
#[derive(Clone)]
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub ctx: Arc<AppContext>,
}

type JsonError = (Status, Json<Value>);

fn method_not_allowed() -> JsonError {
    (
        Status::MethodNotAllowed,
        Json(json!({ "error": "Method Not Allowed" })),
    )
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

/// Uptime and basic wiring info.
#[get("/api/status")]
async fn status(state: &State<AppState>) -> Json<Value> {
    let uptime = (Utc::now() - state.started_at).num_seconds();
    Json(json!({
        "status": "ok",
        "uptime_seconds": uptime,
        "feeds": state.ctx.feeds.len(),
        "store": state.ctx.store.name(),
    }))
}

/// Serve the cached batch. A cold cache is an empty list, not an error.
#[get("/api/get-news")]
async fn get_news(state: &State<AppState>) -> Result<Json<Vec<ProcessedArticle>>, JsonError> {
    match pipeline::latest_news(&state.ctx).await {
        Ok(articles) => Ok(Json(articles)),
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "failed to read news from store");
            Err((
                Status::InternalServerError,
                Json(json!({ "error": "Failed to load news." })),
            ))
        }
    }
}

#[post("/api/get-news")]
fn get_news_post() -> JsonError {
    method_not_allowed()
}

#[put("/api/get-news")]
fn get_news_put() -> JsonError {
    method_not_allowed()
}

#[patch("/api/get-news")]
fn get_news_patch() -> JsonError {
    method_not_allowed()
}

#[delete("/api/get-news")]
fn get_news_delete() -> JsonError {
    method_not_allowed()
}

#[options("/api/get-news")]
fn get_news_options() -> JsonError {
    method_not_allowed()
}

async fn update(state: &AppState) -> (Status, Json<Value>) {
    match pipeline::run_update(&state.ctx).await {
        Ok(outcome) => (
            Status::Ok,
            Json(json!({
                "status": "success",
                "articles_updated": outcome.articles_updated,
            })),
        ),
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "news update cycle failed");
            (
                Status::InternalServerError,
                Json(json!({ "status": "error", "message": e.to_string() })),
            )
        }
    }
}

/// Run one update cycle. Cron services typically call with GET.
#[get("/api/update-news")]
async fn update_news(state: &State<AppState>) -> (Status, Json<Value>) {
    update(state.inner()).await
}

#[post("/api/update-news")]
async fn update_news_post(state: &State<AppState>) -> (Status, Json<Value>) {
    update(state.inner()).await
}

/// Aggregate and rewrite on demand, bypassing the cache.
#[get("/api/fetch-news")]
async fn fetch_news(state: &State<AppState>) -> Json<Vec<ProcessedArticle>> {
    Json(pipeline::run_live(&state.ctx).await)
}

#[post("/api/fetch-news")]
fn fetch_news_post() -> JsonError {
    method_not_allowed()
}

#[put("/api/fetch-news")]
fn fetch_news_put() -> JsonError {
    method_not_allowed()
}

#[patch("/api/fetch-news")]
fn fetch_news_patch() -> JsonError {
    method_not_allowed()
}

#[delete("/api/fetch-news")]
fn fetch_news_delete() -> JsonError {
    method_not_allowed()
}

#[options("/api/fetch-news")]
fn fetch_news_options() -> JsonError {
    method_not_allowed()
}

/// Build the Rocket instance with managed state and all routes mounted. Address and
/// port from `[server]` are merged into Rocket's own figment.
pub fn build_rocket(ctx: Arc<AppContext>, server: &ServerConfig) -> Rocket<Build> {
    let state = AppState {
        started_at: Utc::now(),
        ctx,
    };

    let fig = rocket::Config::figment()
        .merge(("address", server.bind.clone()))
        .merge(("port", server.port));

    rocket::custom(fig).manage(state).mount(
        "/",
        routes![
            health,
            status,
            get_news,
            get_news_post,
            get_news_put,
            get_news_patch,
            get_news_delete,
            get_news_options,
            update_news,
            update_news_post,
            fetch_news,
            fetch_news_post,
            fetch_news_put,
            fetch_news_patch,
            fetch_news_delete,
            fetch_news_options,
        ],
    )
}

/// Launch the HTTP server; blocks until Rocket shuts down.
pub async fn launch_rocket(ctx: Arc<AppContext>, server: &ServerConfig) -> Result<()> {
    tracing::info!(bind = %server.bind, port = server.port, "Starting Rocket HTTP server");
    build_rocket(ctx, server)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
