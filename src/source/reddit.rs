// src/source/reddit.rs
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;

use crate::config::RelayConfig;
use crate::error::FetchError;
use crate::source::{Page, RawItem, SourceClient};

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
    #[serde(default)]
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    #[serde(default)]
    ups: i64,
    title: String,
    #[serde(default)]
    selftext: Option<String>,
    permalink: String,
    created: f64,
    #[serde(default)]
    url_overridden_by_dest: Option<String>,
}

impl From<PostData> for RawItem {
    fn from(p: PostData) -> Self {
        RawItem {
            score: p.ups,
            title: p.title,
            body_text: p.selftext.filter(|s| !s.trim().is_empty()),
            permalink_path: p.permalink,
            // reddit reports seconds as a float ("1700000000.0")
            created_at: p.created.trunc() as i64,
            preview_url: p.url_overridden_by_dest.filter(|u| !u.is_empty()),
        }
    }
}

/// Decode one listing response body into a [`Page`].
///
/// An envelope with zero children decodes fine; deciding that this is
/// [`FetchError::Empty`] is left to the caller.
pub fn parse_listing(body: &str) -> Result<Page, FetchError> {
    let listing: Listing =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    Ok(Page {
        items: listing
            .data
            .children
            .into_iter()
            .map(|c| RawItem::from(c.data))
            .collect(),
        next_cursor: listing.data.after.filter(|a| !a.is_empty()),
    })
}

/// Accept `rust`, `r/rust` or `/r/rust/`; reject anything that is not a subreddit name.
pub fn normalize_topic(raw: &str) -> Option<String> {
    static RE_NAME: OnceCell<Regex> = OnceCell::new();
    let re = RE_NAME.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]{2,21}$").unwrap());

    let t = raw.trim().trim_matches('/');
    let t = t.strip_prefix("r/").unwrap_or(t);
    re.is_match(t).then(|| t.to_string())
}

/// Listing client for `{origin}/r/{topic}/.json`.
#[derive(Clone)]
pub struct RedditClient {
    client: reqwest::Client,
    origin: String,
    page_limit: u32,
}

impl RedditClient {
    pub fn new(
        origin: &str,
        user_agent: &str,
        page_limit: u32,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            origin: origin.trim_end_matches('/').to_string(),
            page_limit,
        })
    }

    pub fn from_config(cfg: &RelayConfig) -> anyhow::Result<Self> {
        Self::new(
            &cfg.listing_origin,
            &cfg.user_agent,
            cfg.page_limit,
            Duration::from_secs(cfg.request_timeout_secs),
        )
    }

    pub fn listing_url(&self, topic: &str) -> String {
        format!("{}/r/{}/.json", self.origin, topic)
    }
}

#[async_trait]
impl SourceClient for RedditClient {
    async fn fetch_page(&self, topic: &str, cursor: Option<&str>) -> Result<Page, FetchError> {
        let t0 = Instant::now();

        let mut req = self
            .client
            .get(self.listing_url(topic))
            .query(&[("limit", self.page_limit.to_string())]);
        if let Some(after) = cursor.filter(|c| !c.is_empty()) {
            req = req.query(&[("after", after)]);
        }

        let resp = req.send().await.map_err(|e| {
            tracing::warn!(target: "source", error = %e, topic, "listing http error");
            FetchError::Transient(e.without_url().to_string())
        })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(target: "source", %status, topic, "listing non-2xx");
            return Err(FetchError::Transient(format!("HTTP {status}")));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Transient(e.without_url().to_string()))?;
        let page = parse_listing(&body)?;

        histogram!("relay_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("relay_pages_fetched_total").increment(1);

        if page.items.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(page)
    }

    fn name(&self) -> &'static str {
        "reddit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_POSTS: &str = r#"{
        "kind": "Listing",
        "data": {
            "after": "t3_next",
            "children": [
                {"kind": "t3", "data": {
                    "ups": 412, "title": "Rust 2024 &amp; you", "selftext": "",
                    "permalink": "/r/rust/comments/a1/rust_2024/", "created": 1700000123.0,
                    "url_overridden_by_dest": "https://blog.rust-lang.org/x"
                }},
                {"kind": "t3", "data": {
                    "ups": 7, "title": "Help with lifetimes", "selftext": "why does this fail",
                    "permalink": "/r/rust/comments/a2/help/", "created": 1700000456.9
                }}
            ]
        }
    }"#;

    #[test]
    fn parses_items_and_cursor() {
        let page = parse_listing(TWO_POSTS).unwrap();
        assert_eq!(page.cursor(), Some("t3_next"));
        assert_eq!(page.items.len(), 2);

        let first = &page.items[0];
        assert_eq!(first.score, 412);
        assert_eq!(first.body_text, None, "empty selftext maps to None");
        assert_eq!(first.preview_url.as_deref(), Some("https://blog.rust-lang.org/x"));
        assert_eq!(first.created_at, 1_700_000_123);

        let second = &page.items[1];
        assert_eq!(second.body_text.as_deref(), Some("why does this fail"));
        assert_eq!(second.preview_url, None);
        assert_eq!(second.created_at, 1_700_000_456);
    }

    #[test]
    fn null_after_means_last_page() {
        let body = r#"{"data": {"after": null, "children": []}}"#;
        let page = parse_listing(body).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.cursor(), None);
    }

    #[test]
    fn garbage_is_malformed() {
        let err = parse_listing("<html>too many requests</html>").unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));

        let missing_title = r#"{"data": {"children": [{"data": {"permalink": "/x", "created": 1.0}}]}}"#;
        assert!(matches!(
            parse_listing(missing_title),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn topic_normalization() {
        assert_eq!(normalize_topic(" python ").as_deref(), Some("python"));
        assert_eq!(normalize_topic("r/rust").as_deref(), Some("rust"));
        assert_eq!(normalize_topic("/r/Ask_Science/").as_deref(), Some("Ask_Science"));
        assert_eq!(normalize_topic("a"), None);
        assert_eq!(normalize_topic("rust/../../api"), None);
        assert_eq!(normalize_topic("two words"), None);
        assert_eq!(normalize_topic(""), None);
    }

    #[test]
    fn listing_url_trims_trailing_slash() {
        let c = RedditClient::new("https://old.reddit.com/", "ua", 100, Duration::from_secs(1))
            .unwrap();
        assert_eq!(c.listing_url("golang"), "https://old.reddit.com/r/golang/.json");
    }
}
