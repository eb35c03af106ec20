// src/lib.rs
// Public library surface for the server binary, the digest CLI and integration tests.

pub mod api;
pub mod config;
pub mod digest;
pub mod dispatch;
pub mod error;
pub mod metrics;
pub mod notify;
pub mod source;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::RelayConfig;
pub use crate::digest::{Digest, DigestPipeline};
pub use crate::dispatch::Dispatcher;
pub use crate::error::{FetchError, PipelineError, RenderError};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "kataskopos=info,tower_http=info,warn";

/// Install the tracing subscriber. `RUST_LOG` overrides the default filter and
/// `LOG_FORMAT=json` switches to JSON lines. A subscriber that is already installed
/// (e.g. by the hosting runtime) is left in place.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
