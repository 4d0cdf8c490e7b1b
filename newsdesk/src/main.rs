/*
newsdesk - single-binary main.rs
This binary starts the Rocket HTTP server and runs the scheduled update worker inside the same process.
*/

use anyhow::Result;
use clap::Parser;
use common::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newsdesk::pipeline::{self, AppContext};
use newsdesk::server::launch_rocket;
use newsdesk::worker::run_worker;

#[derive(Parser, Debug)]
#[command(name = "newsdesk", about = "newsdesk single-binary server + update worker")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable background worker (run server only)
    #[arg(long)]
    no_worker: bool,

    /// Run worker only (do not bind HTTP server)
    #[arg(long, conflicts_with = "no_worker")]
    worker_only: bool,

    /// Run a single update cycle and exit
    #[arg(long, conflicts_with_all = ["no_worker", "worker_only"])]
    once: bool,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Secrets may come from a local .env file
    if let Ok(path) = dotenv::dotenv() {
        info!(path = %path.display(), "loaded environment from file");
    }

    let config = load_config(args.config).await?;

    let ctx = match AppContext::from_config(&config).await {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            error!(error = %format!("{:#}", e), "failed to initialize application context");
            return Err(e);
        }
    };

    if args.once {
        info!("Running a single update cycle");
        let outcome = pipeline::run_update(&ctx).await?;
        info!(articles = outcome.articles_updated, "single update cycle finished");
        return Ok(());
    }

    let shutdown_notify = Arc::new(Notify::new());

    if args.worker_only {
        info!("Starting in worker-only mode");
        let worker = run_worker(ctx.clone(), config.scheduler.clone(), shutdown_notify.clone());

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("ctrl-c received, worker stopping");
            }
            res = worker => {
                if let Err(e) = res {
                    error!(%e, "worker encountered an error");
                }
            }
        }
        info!("worker-only run finished");
        return Ok(());
    }

    let mut worker_handle = None;
    if !args.no_worker {
        info!("Spawning background worker task");
        let w_ctx = ctx.clone();
        let w_cfg = config.scheduler.clone();
        let w_shutdown = shutdown_notify.clone();
        worker_handle = Some(tokio::spawn(async move {
            run_worker(w_ctx, w_cfg, w_shutdown).await
        }));
    } else {
        info!("Background worker disabled via CLI (--no-worker)");
    }

    // Blocks until Rocket shuts down (it handles ctrl-c itself)
    if let Err(e) = launch_rocket(ctx.clone(), &config.server).await {
        error!(%e, "Rocket server failed");
    }

    info!("HTTP server stopped; notifying worker to shutdown");
    shutdown_notify.notify_one();

    if let Some(handle) = worker_handle {
        match tokio::time::timeout(Duration::from_secs(20), handle).await {
            Ok(Ok(Ok(()))) => info!("worker exited cleanly"),
            Ok(Ok(Err(e))) => error!(%e, "worker task returned an error"),
            Ok(Err(join_err)) => error!(%join_err, "worker task panicked"),
            Err(_) => info!("Timed out waiting for worker to exit; continuing shutdown"),
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Resolve config paths: `config.default.toml` is always the base; `--config FILE` or a
/// local `config.toml` overrides it.
async fn load_config(explicit: Option<PathBuf>) -> Result<Config> {
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = explicit {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() { Some(p) } else { None }
    };

    let config = Config::load_with_defaults(
        if default_path.exists() { Some(default_path.as_path()) } else { None },
        override_path.as_deref(),
    )
    .await
    .map_err(|e| {
        error!(error = %format!("{:#}", e), "failed to load configuration");
        e
    })?;

    info!(
        default_path = ?default_path,
        override_path = ?override_path,
        feeds = config.feeds.urls.len(),
        "configuration loaded"
    );
    Ok(config)
}
