// src/notify/mod.rs
pub mod telegram;

use anyhow::Result;

pub use telegram::TelegramNotifier;

/// Outbound chat delivery. One call sends one message.
#[async_trait::async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
    fn name(&self) -> &'static str;
}
