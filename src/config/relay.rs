// src/config/relay.rs
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::digest::{PostTemplate, TimeWindow};

pub const ENV_CONFIG_PATH: &str = "RELAY_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/relay.toml";

pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_MIN_SCORE: &str = "RELAY_MIN_SCORE";
pub const ENV_DIGEST_SIZE: &str = "RELAY_DIGEST_SIZE";
pub const ENV_MAX_PAGES: &str = "RELAY_MAX_PAGES";

pub const DEFAULT_TEMPLATE: &str = "{Title}\n\n{Text}\n\n{Preview}\n⬆ {Ups}\n{Link}";

const MAX_PAGE_LIMIT: u32 = 100;
const MAX_MAX_PAGES: usize = 50;
const MAX_WINDOW_HOURS: i64 = 24 * 365;

fn default_listing_origin() -> String {
    "https://old.reddit.com".to_string()
}
fn default_site_origin() -> String {
    "https://reddit.com".to_string()
}
fn default_bot_api_origin() -> String {
    "https://api.telegram.org".to_string()
}
fn default_user_agent() -> String {
    concat!("kataskopos/", env!("CARGO_PKG_VERSION"), " (telegram digest relay)").to_string()
}
fn default_page_limit() -> u32 {
    100
}
fn default_max_pages() -> usize {
    10
}
fn default_min_score() -> i64 {
    150
}
fn default_digest_size() -> usize {
    5
}
fn default_window_hours() -> i64 {
    24
}
fn default_max_text_chars() -> usize {
    500
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_pipeline_timeout_secs() -> u64 {
    30
}
fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

/// How the recency window is derived from "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindowMode {
    /// Current UTC calendar day.
    #[default]
    Today,
    /// The last `window_hours` hours.
    Trailing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_listing_origin")]
    pub listing_origin: String,
    /// Prefix for permalinks in the digest.
    #[serde(default = "default_site_origin")]
    pub site_origin: String,
    #[serde(default = "default_bot_api_origin")]
    pub bot_api_origin: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Items per listing request (reddit caps this at 100).
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    #[serde(default = "default_min_score")]
    pub min_score: i64,
    #[serde(default = "default_digest_size")]
    pub digest_size: usize,
    #[serde(default)]
    pub window: WindowMode,
    /// Only used with `window = "trailing"`.
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,

    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_pipeline_timeout_secs")]
    pub pipeline_timeout_secs: u64,

    #[serde(default = "default_template")]
    pub template: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listing_origin: default_listing_origin(),
            site_origin: default_site_origin(),
            bot_api_origin: default_bot_api_origin(),
            user_agent: default_user_agent(),
            page_limit: default_page_limit(),
            max_pages: default_max_pages(),
            min_score: default_min_score(),
            digest_size: default_digest_size(),
            window: WindowMode::default(),
            window_hours: default_window_hours(),
            max_text_chars: default_max_text_chars(),
            request_timeout_secs: default_request_timeout_secs(),
            pipeline_timeout_secs: default_pipeline_timeout_secs(),
            template: default_template(),
        }
    }
}

impl RelayConfig {
    /// Parse TOML content, then sanitize.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: RelayConfig = toml::from_str(s).context("parsing relay config toml")?;
        cfg.sanitized()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading relay config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load config using env var + fallbacks, then apply env overrides:
    /// 1) $RELAY_CONFIG_PATH
    /// 2) config/relay.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if p.exists() {
                Self::load_from(&p)?
            } else {
                Self::default()
            }
        };
        base.with_env_overrides().sanitized()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(v) = parse_env::<i64>(ENV_MIN_SCORE) {
            self.min_score = v;
        }
        if let Some(v) = parse_env::<usize>(ENV_DIGEST_SIZE) {
            self.digest_size = v;
        }
        if let Some(v) = parse_env::<usize>(ENV_MAX_PAGES) {
            self.max_pages = v;
        }
        self
    }

    /// Clamp numeric knobs into range and validate the template.
    fn sanitized(mut self) -> Result<Self> {
        self.page_limit = self.page_limit.clamp(1, MAX_PAGE_LIMIT);
        self.max_pages = self.max_pages.clamp(1, MAX_MAX_PAGES);
        if self.digest_size == 0 {
            self.digest_size = default_digest_size();
        }
        if self.window_hours <= 0 {
            self.window_hours = default_window_hours();
        }
        self.window_hours = self.window_hours.min(MAX_WINDOW_HOURS);
        if self.pipeline_timeout_secs == 0 {
            self.pipeline_timeout_secs = default_pipeline_timeout_secs();
        }
        PostTemplate::new(&self.template).context("invalid post template")?;
        Ok(self)
    }

    /// Recency window relative to `now`.
    pub fn window_at(&self, now: DateTime<Utc>) -> TimeWindow {
        match self.window {
            WindowMode::Today => TimeWindow::calendar_day(now),
            WindowMode::Trailing => {
                let hours = self.window_hours.clamp(1, MAX_WINDOW_HOURS);
                TimeWindow::trailing(now, ChronoDuration::hours(hours))
            }
        }
    }
}

/// Bot token from the environment. Never logged.
pub fn bot_token_from_env() -> Result<String> {
    std::env::var(ENV_BOT_TOKEN)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| anyhow!("Missing {ENV_BOT_TOKEN} env var"))
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}
