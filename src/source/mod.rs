// src/source/mod.rs
pub mod accumulate;
pub mod reddit;

use crate::error::FetchError;

pub use accumulate::{collect, AccumulatedSet};
pub use reddit::RedditClient;

/// One listing entry as read from the source.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct RawItem {
    pub score: i64,
    pub title: String,
    pub body_text: Option<String>,
    pub permalink_path: String, // relative, e.g. "/r/rust/comments/abc/x/"
    pub created_at: i64,        // unix seconds
    pub preview_url: Option<String>,
}

/// One page of a listing. `next_cursor` absent or empty means last page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<RawItem>,
    pub next_cursor: Option<String>,
}

impl Page {
    /// Cursor for the following page, if there is one.
    pub fn cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref().filter(|c| !c.is_empty())
    }
}

/// Reads one listing page per call. Implementations must not retry.
#[async_trait::async_trait]
pub trait SourceClient: Send + Sync {
    async fn fetch_page(&self, topic: &str, cursor: Option<&str>) -> Result<Page, FetchError>;
    fn name(&self) -> &'static str;
}
