// src/metrics.rs
use anyhow::Result;
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Call once per process.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("relay_commands_total", "Inbound chat messages by command.");
        describe_counter!("relay_pages_fetched_total", "Listing pages read from reddit.");
        describe_counter!(
            "relay_posts_admitted_total",
            "Posts that passed the score and recency filter."
        );
        describe_counter!(
            "relay_pipeline_errors_total",
            "Search invocations that ended without a digest, by kind."
        );
        describe_counter!("relay_messages_sent_total", "Messages delivered to Telegram.");
        describe_counter!("relay_delivery_errors_total", "Failed sendMessage calls.");
        describe_histogram!("relay_fetch_ms", "Listing page fetch time in milliseconds.");
        describe_histogram!("relay_pipeline_ms", "Whole pipeline time in milliseconds.");
    });
}
