// src/dispatch.rs
//! Chat command handling. Every call is independent: parse, run, reply.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use metrics::counter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::digest::{record_pipeline_ms, Digest, DigestPipeline};
use crate::error::{FetchError, PipelineError};
use crate::notify::ChatNotifier;
use crate::source::reddit::normalize_topic;

pub const SEARCH_COMMAND: &str = "/search";
pub const USAGE: &str = "use /search {topic}, e.g: /search python";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Unrecognized,
}

/// `/search rust`, `/search@SomeBot rust` → `Search("rust")`. Anything else, including a bare
/// `/search`, is `Unrecognized`.
pub fn parse_command(text: &str) -> Command {
    let Some(rest) = text.trim_start().strip_prefix(SEARCH_COMMAND) else {
        return Command::Unrecognized;
    };

    let args = if let Some(addressed) = rest.strip_prefix('@') {
        addressed
            .split_once(char::is_whitespace)
            .map(|(_, a)| a)
            .unwrap_or_default()
    } else if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        rest
    } else {
        // e.g. "/searching"
        return Command::Unrecognized;
    };

    match args.trim() {
        "" => Command::Unrecognized,
        topic => Command::Search(topic.to_string()),
    }
}

/// What one inbound message resulted in.
#[derive(Debug)]
pub enum Outcome {
    Usage,
    Digest(Digest),
    Failed { topic: String, error: PipelineError },
}

impl Outcome {
    /// Messages to send back, in order.
    pub fn replies(&self) -> Vec<String> {
        match self {
            Self::Usage => vec![USAGE.to_string()],
            Self::Digest(d) => d.entries.clone(),
            Self::Failed { topic, error } => vec![error.user_message(topic)],
        }
    }
}

pub struct Dispatcher {
    pipeline: DigestPipeline,
    notifier: Arc<dyn ChatNotifier>,
    deadline: Duration,
}

impl Dispatcher {
    pub fn new(pipeline: DigestPipeline, notifier: Arc<dyn ChatNotifier>) -> Self {
        let deadline = Duration::from_secs(pipeline.config().pipeline_timeout_secs);
        Self {
            pipeline,
            notifier,
            deadline,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Handle one chat message and deliver the replies to `chat_id`.
    pub async fn handle_text(&self, chat_id: i64, text: &str) -> Outcome {
        crate::metrics::ensure_metrics_described();

        let outcome = match parse_command(text) {
            Command::Unrecognized => {
                counter!("relay_commands_total", "command" => "unrecognized").increment(1);
                Outcome::Usage
            }
            Command::Search(arg) => {
                counter!("relay_commands_total", "command" => "search").increment(1);
                // replies name the subreddit, not what the user typed ("r/rust" → "rust")
                let topic = normalize_topic(&arg).unwrap_or(arg);
                match self.search(&topic).await {
                    Ok(digest) => {
                        info!(
                            target: "webhook",
                            chat_id,
                            topic = %digest.topic,
                            admissible = digest.admissible,
                            sent = digest.entries.len(),
                            "digest ready"
                        );
                        Outcome::Digest(digest)
                    }
                    Err(error) => {
                        counter!("relay_pipeline_errors_total", "kind" => error.kind())
                            .increment(1);
                        warn!(target: "webhook", chat_id, %topic, kind = error.kind(), error = %error, "search failed");
                        Outcome::Failed { topic, error }
                    }
                }
            }
        };

        self.deliver(chat_id, &outcome.replies()).await;
        outcome
    }

    async fn search(&self, topic: &str) -> Result<Digest, PipelineError> {
        let t0 = Instant::now();
        let res = self.search_inner(topic).await;
        record_pipeline_ms(t0);
        res
    }

    async fn search_inner(&self, topic: &str) -> Result<Digest, PipelineError> {
        let gathered = tokio::time::timeout(self.deadline, self.pipeline.gather(topic, Utc::now()))
            .await
            .map_err(|_| FetchError::Transient("pipeline deadline exceeded".to_string()))??;

        // fresh entropy per invocation
        let mut rng = StdRng::from_os_rng();
        self.pipeline.digest(gathered, &mut rng)
    }

    async fn deliver(&self, chat_id: i64, replies: &[String]) {
        for text in replies {
            if let Err(e) = self.notifier.send_text(chat_id, text).await {
                warn!(
                    target: "delivery",
                    chat_id,
                    notifier = self.notifier.name(),
                    error = %e,
                    "reply not delivered"
                );
                return;
            }
        }
    }
}
