//! Store behavior against the REST backend, served by a mock HTTP server.

use std::sync::Arc;

use blogdeck::application::navigation::NavigationHistory;
use blogdeck::application::store::PostStore;
use blogdeck::domain::posts::PostId;
use blogdeck::infra::remote::RemotePostsRepository;
use httpmock::MockServer;
use serde_json::json;

fn store_for(server: &MockServer) -> PostStore {
    let repo = Arc::new(RemotePostsRepository::new(&server.base_url()).expect("remote repo"));
    PostStore::new(repo.clone(), repo, Arc::new(NavigationHistory::new()))
}

#[tokio::test]
async fn mount_loads_posts_from_collection() {
    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method("GET").path("/posts");
        then.status(200).json_body(json!([
            {"id": 1, "title": "A", "datetime": "March 05, 2024 3:07:09 PM", "body": "x"},
            {"id": 2, "title": "B", "datetime": "March 06, 2024 3:07:09 PM", "body": "z"}
        ]));
    });

    let mut store = store_for(&server);
    store.mount().await;

    list.assert();
    assert_eq!(store.posts().len(), 2);
    assert_eq!(store.search_results()[0].id, PostId::new(2));
    assert!(store.fetch_error().is_none());
}

#[tokio::test]
async fn mount_failure_reports_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/posts");
        then.status(500).body("boom");
    });

    let mut store = store_for(&server);
    store.mount().await;

    assert!(store.posts().is_empty());
    assert!(!store.is_loading());
    assert_eq!(
        store.fetch_error(),
        Some("server responded with status 500: boom")
    );
}

#[tokio::test]
async fn create_posts_and_adopts_server_representation() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/posts");
        then.status(200).json_body(json!([]));
    });
    let create = server.mock(|when, then| {
        when.method("POST")
            .path("/posts")
            .json_body_includes(r#"{"id": 1, "title": "A", "body": "x"}"#);
        then.status(201).json_body(json!(
            {"id": 1, "title": "A (saved)", "datetime": "server time", "body": "x"}
        ));
    });

    let mut store = store_for(&server);
    store.mount().await;
    store.submit_new_post("A", "x").await;

    create.assert();
    assert_eq!(store.posts()[0].title, "A (saved)");
    assert_eq!(store.posts()[0].datetime, "server time");
    assert_eq!(store.search_results()[0].title, "A (saved)");
}

#[tokio::test]
async fn edit_and_delete_target_item_paths() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/posts");
        then.status(200).json_body(json!([
            {"id": 1, "title": "A", "datetime": "d", "body": "x"},
            {"id": 2, "title": "B", "datetime": "d", "body": "y"}
        ]));
    });
    let update = server.mock(|when, then| {
        when.method("PUT")
            .path("/posts/2")
            .json_body_includes(r#"{"id": 2, "title": "B2", "body": "y2"}"#);
        then.status(200)
            .json_body(json!({"id": 2, "title": "B2", "datetime": "d2", "body": "y2"}));
    });
    let delete = server.mock(|when, then| {
        when.method("DELETE").path("/posts/1");
        then.status(200).json_body(json!({}));
    });

    let mut store = store_for(&server);
    store.mount().await;
    store.submit_edit(PostId::new(2), "B2", "y2").await;
    store.delete_post(PostId::new(1)).await;

    update.assert();
    delete.assert();
    assert_eq!(store.posts().len(), 1);
    assert_eq!(store.posts()[0].datetime, "d2");
}

#[tokio::test]
async fn failed_write_keeps_optimistic_state() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/posts");
        then.status(200).json_body(json!([]));
    });
    let create = server.mock(|when, then| {
        when.method("POST").path("/posts");
        then.status(500).body("db down");
    });

    let mut store = store_for(&server);
    store.mount().await;
    store.submit_new_post("A", "x").await;

    create.assert();
    assert_eq!(store.posts().len(), 1);
    assert_eq!(store.posts()[0].title, "A");
    assert_eq!(store.post_title(), "");
}

#[tokio::test]
async fn missing_edit_sends_nothing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/posts");
        then.status(200).json_body(json!([]));
    });
    let update = server.mock(|when, then| {
        when.method("PUT");
        then.status(200).json_body(json!({}));
    });

    let mut store = store_for(&server);
    store.mount().await;
    store.submit_edit(PostId::new(9), "ghost", "ghost").await;

    update.assert_hits(0);
    assert!(store.posts().is_empty());
}
