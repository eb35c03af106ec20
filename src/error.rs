// src/error.rs
//! Error taxonomy for the digest pipeline.
//!
//! Every stage returns its own error type; the dispatcher turns a [`PipelineError`] into a
//! chat reply plus a log line. Nothing here is fatal to the process.

/// Failure while reading listing pages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Network failure, timeout, or non-2xx status. Not retried.
    #[error("listing request failed: {0}")]
    Transient(String),

    /// The response body did not match the listing envelope.
    #[error("listing response could not be decoded: {0}")]
    Malformed(String),

    /// The page carried zero items.
    #[error("listing page is empty")]
    Empty,
}

/// Failure while rendering a post through the template.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("unknown template field `{0}`")]
    UnknownField(String),

    #[error("unclosed `{{` at byte {0}")]
    Unclosed(usize),

    #[error("template renders to empty text")]
    EmptyOutput,
}

/// Outcome of one pipeline invocation that did not produce a digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid topic `{0}`")]
    InvalidTopic(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("no admissible posts for `{topic}`")]
    NoAdmissiblePosts { topic: String },

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PipelineError {
    /// Short label used for logs and the `kind` metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidTopic(_) => "invalid_topic",
            Self::Fetch(FetchError::Transient(_)) => "transient",
            Self::Fetch(FetchError::Malformed(_)) => "malformed",
            Self::Fetch(FetchError::Empty) => "empty",
            Self::NoAdmissiblePosts { .. } => "no_admissible_posts",
            Self::Render(_) => "render",
        }
    }

    /// Human-readable reply sent back to the chat.
    pub fn user_message(&self, topic: &str) -> String {
        match self {
            Self::InvalidTopic(t) => {
                format!("'{t}' is not a valid subreddit name, e.g: /search python")
            }
            Self::Fetch(FetchError::Transient(_)) => {
                format!("could not reach reddit for r/{topic}, try again later")
            }
            Self::Fetch(FetchError::Malformed(_)) => {
                format!("reddit returned an unexpected response for r/{topic}")
            }
            Self::Fetch(FetchError::Empty) => format!("no posts found in r/{topic}"),
            Self::NoAdmissiblePosts { topic } => {
                format!("no popular posts from today in r/{topic}")
            }
            Self::Render(_) => "failed to format the digest".to_string(),
        }
    }
}
