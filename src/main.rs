//! kataskopos — Binary Entrypoint
//! Boots the Axum HTTP server: Telegram webhook, health check and Prometheus metrics.

use std::sync::Arc;

use anyhow::Context;
use shuttle_axum::ShuttleAxum;

use kataskopos::config::{bot_token_from_env, RelayConfig};
use kataskopos::metrics::Metrics;
use kataskopos::notify::TelegramNotifier;
use kataskopos::source::RedditClient;
use kataskopos::{router, AppState, DigestPipeline, Dispatcher};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    kataskopos::init_tracing();

    let cfg = RelayConfig::load_default().context("loading relay config")?;
    let token = bot_token_from_env()?;

    let source = RedditClient::from_config(&cfg).context("building reddit client")?;
    let notifier = TelegramNotifier::from_config(&cfg, token);

    tracing::info!(
        listing = %cfg.listing_origin,
        min_score = cfg.min_score,
        digest_size = cfg.digest_size,
        max_pages = cfg.max_pages,
        window = ?cfg.window,
        "relay configured"
    );

    let pipeline = DigestPipeline::new(Arc::new(source), cfg).context("post template")?;
    let dispatcher = Dispatcher::new(pipeline, Arc::new(notifier));

    let metrics = Metrics::init().context("prometheus recorder")?;
    let router = router(AppState::new(dispatcher)).merge(metrics.router());

    Ok(router.into())
}
