//! End-to-end flows through the feed controller.
//!
//! Requests the controller emits are executed by a real `ApiClient` against
//! a wiremock server and the results are handed back through `complete`,
//! the same round trip the UI event loop performs.

use newsdesk::api::ApiClient;
use newsdesk::feed::{FeedController, FetchRequest, PageLink, QueryKey, SlotUpdate, Tab};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::time::Instant;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEBOUNCE: Duration = Duration::from_millis(300);

fn controller() -> FeedController {
    FeedController::new(DEBOUNCE, NonZeroUsize::new(16).unwrap())
}

fn page_body(first_id: i64, page: u32, last_page: u32) -> serde_json::Value {
    json!({
        "success": true,
        "message": "",
        "data": {
            "articles": [
                {"id": first_id, "title": format!("Story {}", first_id)},
                {"id": first_id + 1, "title": format!("Story {}", first_id + 1)}
            ],
            "total": u64::from(last_page) * 2,
            "page": page,
            "per_page": 2,
            "last_page": last_page
        }
    })
}

/// Run every request and feed its result back, returning the updates.
async fn run_all(
    client: &ApiClient,
    feed: &mut FeedController,
    requests: Vec<FetchRequest>,
) -> Vec<SlotUpdate> {
    let mut updates = Vec::new();
    for request in requests {
        let result = client
            .fetch_page(&request.key, None)
            .await
            .map_err(|e| e.to_string());
        updates.push(feed.complete(&request.key, request.generation, result));
    }
    updates
}

fn titles(feed: &FeedController) -> Vec<String> {
    feed.active_page()
        .map(|p| p.items.iter().map(|a| a.title.clone()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_browse_search_and_paginate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(query_param("search", ""))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(1, 1, 12)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(query_param("search", "mars"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(50, 1, 3)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(query_param("search", "mars"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(60, 2, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap();
    let mut feed = controller();

    let requests = feed.refresh();
    let updates = run_all(&client, &mut feed, requests).await;
    assert_eq!(updates, vec![SlotUpdate::Applied]);
    assert_eq!(titles(&feed), vec!["Story 1", "Story 2"]);
    let bar = feed.pagination().unwrap();
    assert_eq!(bar.last_page, 12);
    assert!(bar.links.contains(&PageLink::Ellipsis));
    assert!(!bar.previous_enabled);

    // Typing "ma" never reaches the server
    let start = Instant::now();
    assert!(feed.set_search_text("m", start).is_empty());
    assert!(feed.set_search_text("ma", start + Duration::from_millis(40)).is_empty());
    assert!(feed.tick(start + Duration::from_millis(400)).is_empty());
    // Old results stay on screen
    assert_eq!(titles(&feed), vec!["Story 1", "Story 2"]);

    let typed = start + Duration::from_millis(500);
    feed.set_search_text("mar", typed);
    feed.set_search_text("mars", typed + Duration::from_millis(50));
    assert!(feed.tick(typed + Duration::from_millis(200)).is_empty());
    let requests = feed.tick(typed + Duration::from_millis(50) + DEBOUNCE);
    assert_eq!(requests.len(), 1);
    run_all(&client, &mut feed, requests).await;
    assert_eq!(titles(&feed), vec!["Story 50", "Story 51"]);

    let next = feed.pagination().and_then(|p| p.next_page()).unwrap();
    let requests = feed.set_page(next);
    run_all(&client, &mut feed, requests).await;
    assert_eq!(titles(&feed), vec!["Story 60", "Story 61"]);
    assert_eq!(feed.pagination().map(|p| p.current_page), Some(2));
}

#[tokio::test]
async fn test_facet_toggle_round_trip_serves_from_cache_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(query_param("category_ids[]", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(40, 1, 1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(1, 1, 5)))
        .mount(&server)
        .await;

    let client = ApiClient::new(&format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap();
    let mut feed = controller();
    let requests = feed.refresh();
    run_all(&client, &mut feed, requests).await;

    let requests = feed.toggle_category(4);
    run_all(&client, &mut feed, requests).await;
    assert_eq!(titles(&feed), vec!["Story 40", "Story 41"]);

    // Untoggling shows the cached unfiltered page before the refetch lands
    let requests = feed.toggle_category(4);
    assert_eq!(requests.len(), 1);
    assert_eq!(titles(&feed), vec!["Story 1", "Story 2"]);
    assert!(feed.is_loading(Tab::Explore));
    assert_eq!(feed.filters().page(), 1);
    run_all(&client, &mut feed, requests).await;
    assert!(!feed.is_loading(Tab::Explore));
}

#[tokio::test]
async fn test_server_failure_keeps_previous_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(1, 1, 4)))
        .mount(&server)
        .await;

    let client = ApiClient::new(&format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap();
    let mut feed = controller();
    let requests = feed.refresh();
    run_all(&client, &mut feed, requests).await;

    let requests = feed.set_page(2);
    let updates = run_all(&client, &mut feed, requests).await;
    assert_eq!(updates, vec![SlotUpdate::Failed]);
    assert_eq!(titles(&feed), vec!["Story 1", "Story 2"]);
    assert!(feed.last_error(Tab::Explore).is_some_and(|e| e.contains("boom")));
}

#[tokio::test(start_paused = true)]
async fn test_debounce_follows_tokio_clock() {
    let mut feed = controller();
    feed.refresh();

    feed.set_search_text("ocean", Instant::now());
    tokio::time::advance(Duration::from_millis(299)).await;
    assert!(feed.tick(Instant::now()).is_empty());
    assert!(feed.is_search_pending());

    tokio::time::advance(Duration::from_millis(1)).await;
    let requests = feed.tick(Instant::now());
    match requests.as_slice() {
        [FetchRequest {
            key: QueryKey::Explore(q),
            ..
        }] => assert_eq!(q.search, "ocean"),
        other => panic!("unexpected requests {other:?}"),
    }
}

#[test]
fn test_tab_switch_keeps_explore_filters() {
    let mut feed = controller();
    feed.set_personalized_enabled(true);
    feed.refresh();
    feed.toggle_author(2);
    feed.toggle_category(9);
    feed.set_search_text("election", Instant::now());
    feed.commit_search();

    feed.set_active_tab(Tab::Personalized);
    feed.set_active_tab(Tab::Explore);

    let filters = feed.filters();
    assert_eq!(filters.search_text(), "election");
    assert!(filters.is_author_selected(2));
    assert!(filters.is_category_selected(9));
    assert_eq!(feed.applied_search(), "election");
}
