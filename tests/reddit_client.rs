// tests/reddit_client.rs
//
// RedditClient against a local axum server that serves canned listing pages.

use std::collections::HashMap;
use std::time::Duration;

use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use kataskopos::source::{collect, RedditClient, SourceClient};
use kataskopos::FetchError;

fn post(title: &str, n: u32) -> Value {
    json!({ "kind": "t3", "data": {
        "ups": 300, "title": title, "selftext": "",
        "permalink": format!("/r/rust/comments/{n}/"), "created": 1700000000.0
    }})
}

fn listing(children: Vec<Value>, after: Option<&str>) -> Json<Value> {
    Json(json!({ "kind": "Listing", "data": { "children": children, "after": after } }))
}

// Page one echoes the `limit` it was asked for in its title; `after=t3_x` gives page two.
async fn rust_pages(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let limit = q.get("limit").cloned().unwrap_or_default();
    match q.get("after").map(String::as_str) {
        None => listing(vec![post(&format!("a limit={limit}"), 1)], Some("t3_x")),
        Some("t3_x") => listing(vec![post("b", 2)], None),
        Some(_) => listing(vec![], None),
    }
}

async fn spawn_listing_server() -> String {
    let app = Router::new()
        .route("/r/rust/.json", get(rust_pages))
        .route("/r/quiet/.json", get(|| async { listing(vec![], None) }))
        .route(
            "/r/busy/.json",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        )
        .route("/r/captcha/.json", get(|| async { "<html>are you a robot?</html>" }));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

fn client(origin: &str) -> RedditClient {
    RedditClient::new(origin, "kataskopos-tests", 100, Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn sends_limit_and_follows_after_cursor() {
    let c = client(&spawn_listing_server().await);

    let first = c.fetch_page("rust", None).await.unwrap();
    assert_eq!(first.items.len(), 1);
    assert_eq!(first.items[0].title, "a limit=100");
    assert_eq!(first.cursor(), Some("t3_x"));

    let second = c.fetch_page("rust", first.cursor()).await.unwrap();
    assert_eq!(second.items[0].title, "b");
    assert_eq!(second.cursor(), None);
}

#[tokio::test]
async fn collect_walks_every_page_over_http() {
    let c = client(&spawn_listing_server().await);
    let acc = collect(&c, "rust", 10).await.unwrap();
    assert_eq!(acc.pages, 2);
    let titles: Vec<_> = acc.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["a limit=100", "b"]);
}

#[tokio::test]
async fn non_success_status_is_transient() {
    let c = client(&spawn_listing_server().await);
    match c.fetch_page("busy", None).await {
        Err(FetchError::Transient(msg)) => assert!(msg.contains("429"), "{msg}"),
        other => panic!("expected Transient, got {other:?}"),
    }
}

#[tokio::test]
async fn zero_children_is_empty_and_garbage_is_malformed() {
    let c = client(&spawn_listing_server().await);
    assert_eq!(c.fetch_page("quiet", None).await.unwrap_err(), FetchError::Empty);
    assert!(matches!(
        c.fetch_page("captcha", None).await,
        Err(FetchError::Malformed(_))
    ));
}

#[tokio::test]
async fn unreachable_origin_is_transient() {
    // bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let c = client(&format!("http://{addr}"));
    assert!(matches!(
        c.fetch_page("rust", None).await,
        Err(FetchError::Transient(_))
    ));
}
