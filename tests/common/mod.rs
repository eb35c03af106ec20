// tests/common/mod.rs
// Test doubles shared by the integration suites.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use kataskopos::notify::ChatNotifier;
use kataskopos::source::{Page, RawItem, SourceClient};
use kataskopos::FetchError;

/// Listing double. Each topic has a list of pages; the cursor handed out after page `n`
/// is `"{topic}:{n+1}"`, so lookups need no per-topic mutable state.
#[derive(Default)]
pub struct ScriptedSource {
    topics: HashMap<String, Vec<Result<Vec<RawItem>, FetchError>>>,
    /// Topics whose last page still hands out a cursor.
    endless: Vec<String>,
    delay: Option<Duration>,
    pub calls: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_topic(mut self, topic: &str, pages: Vec<Vec<RawItem>>) -> Self {
        self.topics
            .insert(topic.to_string(), pages.into_iter().map(Ok).collect());
        self
    }

    pub fn with_results(
        mut self,
        topic: &str,
        pages: Vec<Result<Vec<RawItem>, FetchError>>,
    ) -> Self {
        self.topics.insert(topic.to_string(), pages);
        self
    }

    /// Repeat the single page of `topic` forever.
    pub fn endless(mut self, topic: &str, page: Vec<RawItem>) -> Self {
        self.topics.insert(topic.to_string(), vec![Ok(page)]);
        self.endless.push(topic.to_string());
        self
    }

    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay = Some(d);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn cursors(&self) -> Vec<Option<String>> {
        self.calls.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }
}

#[async_trait]
impl SourceClient for ScriptedSource {
    async fn fetch_page(&self, topic: &str, cursor: Option<&str>) -> Result<Page, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((topic.to_string(), cursor.map(str::to_owned)));
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }

        let Some(pages) = self.topics.get(topic) else {
            return Err(FetchError::Empty);
        };
        let index = match cursor {
            None => 0,
            Some(c) => c
                .rsplit(':')
                .next()
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap_or(usize::MAX),
        };

        let endless = self.endless.iter().any(|t| t == topic);
        let slot = if endless { Some(&pages[0]) } else { pages.get(index) };
        let items = match slot {
            Some(Ok(items)) => items.clone(),
            Some(Err(e)) => return Err(e.clone()),
            None => return Err(FetchError::Empty),
        };
        if items.is_empty() {
            return Err(FetchError::Empty);
        }

        let has_next = endless || index.saturating_add(1) < pages.len();
        Ok(Page {
            items,
            next_cursor: has_next.then(|| format!("{topic}:{}", index + 1)),
        })
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn item(topic: &str, n: usize, score: i64, created_at: i64) -> RawItem {
    RawItem {
        score,
        title: format!("{topic} post {n}"),
        body_text: Some(format!("body of {topic} {n}")),
        permalink_path: format!("/r/{topic}/comments/{n}/"),
        created_at,
        preview_url: None,
    }
}

/// Records every message instead of sending it.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(i64, String)>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatNotifier for RecordingNotifier {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        if self.fail {
            return Err(anyhow!("chat unreachable"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
