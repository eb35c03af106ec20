// src/api.rs
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::dispatch::Dispatcher;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

/// Subset of a Telegram `Update` the relay reads.
#[derive(Debug, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub text: Option<String>,
    pub chat: Chat,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/webhook", post(webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Undecodable bodies are rejected by the `Json` extractor before this runs, so no reply is
/// attempted for them. Decoded updates always get 200, whatever the search outcome, so
/// Telegram does not redeliver.
async fn webhook(State(state): State<AppState>, Json(update): Json<Update>) -> StatusCode {
    let Some(message) = update.message else {
        tracing::debug!(target: "webhook", "update without message ignored");
        return StatusCode::OK;
    };

    let text = message.text.unwrap_or_default();
    state.dispatcher.handle_text(message.chat.id, &text).await;
    StatusCode::OK
}
