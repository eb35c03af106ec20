// src/notify/telegram.rs
use anyhow::{anyhow, Result};
use metrics::counter;
use reqwest::Client;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

use super::ChatNotifier;
use crate::config::RelayConfig;

/// Bot API hard limit for one message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Clone)]
pub struct TelegramNotifier {
    api_origin: String,
    token: String,
    client: Client,
    timeout: Duration,
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_origin", &self.api_origin)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

impl TelegramNotifier {
    pub fn new(api_origin: &str, token: String) -> Self {
        Self {
            api_origin: api_origin.trim_end_matches('/').to_string(),
            token,
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_config(cfg: &RelayConfig, token: String) -> Self {
        Self::new(&cfg.bot_api_origin, token).with_timeout(cfg.request_timeout_secs)
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_origin, self.token)
    }
}

/// Cut `text` to the Bot API message limit.
pub fn clip_message(text: &str) -> &str {
    match text.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[async_trait::async_trait]
impl ChatNotifier for TelegramNotifier {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        let form = SendMessage {
            chat_id,
            text: clip_message(text),
        };

        // the URL carries the bot token, so errors are logged without it
        let rsp = self
            .client
            .post(self.send_message_url())
            .timeout(self.timeout)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                counter!("relay_delivery_errors_total").increment(1);
                anyhow!("telegram sendMessage failed: {}", e.without_url())
            })?;

        let status = rsp.status();
        let body = rsp.text().await.unwrap_or_default();
        tracing::debug!(target: "delivery", chat_id, %status, %body, "sendMessage response");

        if !status.is_success() {
            counter!("relay_delivery_errors_total").increment(1);
            return Err(anyhow!("telegram sendMessage HTTP error: {status}"));
        }
        counter!("relay_messages_sent_total").increment(1);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}
