//! HttpMemoryStore tests against an in-process mock memory service.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use memdesk_memory::{
    HttpMemoryStore, HttpMemoryStoreOptions, MemoryError, MemoryMetadata, MemoryRole,
    MemoryStore, NewMemory, SearchOptions, UserId,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct MockService {
    stored: Arc<Mutex<Vec<Value>>>,
    searches: Arc<Mutex<Vec<Value>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        == Some("Token secret")
}

async fn add_memory(
    State(service): State<MockService>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "bad token" })));
    }
    service.stored.lock().expect("lock").push(body);
    (StatusCode::OK, Json(json!([{ "id": "new", "event": "ADD" }])))
}

async fn list_memories(
    State(service): State<MockService>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let user_id = params.get("user_id").cloned().unwrap_or_default();
    let results = service
        .stored
        .lock()
        .expect("lock")
        .iter()
        .filter(|body| body["user_id"] == json!(user_id))
        .enumerate()
        .map(|(idx, body)| {
            json!({
                "id": format!("m{idx}"),
                "memory": body["messages"][0]["content"],
                "user_id": body["user_id"],
                "metadata": body["metadata"],
                "created_at": "2026-10-01T12:00:00Z",
            })
        })
        .collect::<Vec<_>>();
    Json(json!({ "results": results }))
}

async fn search_memories(
    State(service): State<MockService>,
    Json(body): Json<Value>,
) -> Json<Value> {
    service.searches.lock().expect("lock").push(body);
    Json(json!([
        { "id": "s1", "memory": "ordered a phone", "score": 0.4, "user_id": "alice" },
        { "id": "s2", "memory": "phone arrived cracked", "score": 0.9, "user_id": "alice" },
        { "id": "s3", "memory": "bob's secret", "score": 0.99, "user_id": "bob" },
        { "id": "s4", "score": 0.5 },
    ]))
}

async fn spawn_service(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{addr}")
}

fn store(url: String, api_key: &str) -> HttpMemoryStore {
    HttpMemoryStore::new(HttpMemoryStoreOptions {
        url,
        api_key: api_key.to_string(),
        timeout: None,
    })
    .expect("store")
}

fn user(id: &str) -> UserId {
    UserId::new(id).expect("user id")
}

async fn mock_service() -> (MockService, String) {
    let service = MockService::default();
    let router = Router::new()
        .route("/v1/memories/", post(add_memory).get(list_memories))
        .route("/v1/memories/search/", post(search_memories))
        .with_state(service.clone());
    let url = spawn_service(router).await;
    (service, url)
}

#[tokio::test]
async fn add_then_get_all_round_trips_tags() {
    let (service, url) = mock_service().await;
    let store = store(format!("{url}/"), "secret");
    let alice = user("alice");

    store
        .add(NewMemory::new(
            alice.clone(),
            "where is my order?",
            MemoryMetadata::new("customer-support", MemoryRole::User),
        ))
        .await
        .expect("add");

    let sent = service.stored.lock().expect("lock")[0].clone();
    assert_eq!(sent["user_id"], json!("alice"));
    assert_eq!(sent["metadata"]["app_id"], json!("customer-support"));
    assert_eq!(sent["metadata"]["role"], json!("user"));
    assert_eq!(sent["infer"], json!(false));

    let records = store.get_all(&alice).await.expect("get_all");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].content, "where is my order?");
    assert_eq!(records[0].role(), Some(MemoryRole::User));
    assert!(records[0].created_at.is_some());

    assert!(store.get_all(&user("bob")).await.expect("bob").is_empty());
}

#[tokio::test]
async fn search_orders_hits_and_drops_foreign_or_textless_entries() {
    let (service, url) = mock_service().await;
    let store = store(url, "secret");

    let hits = store
        .search(&user("alice"), "phone", SearchOptions::with_limit(3))
        .await
        .expect("search");

    let contents: Vec<_> = hits.iter().map(|hit| hit.record.content.as_str()).collect();
    assert_eq!(contents, vec!["phone arrived cracked", "ordered a phone"]);

    let sent = service.searches.lock().expect("lock")[0].clone();
    assert_eq!(sent["query"], json!("phone"));
    assert_eq!(sent["limit"], json!(3));
}

#[tokio::test]
async fn rejected_credentials_surface_as_status_error() {
    let (_service, url) = mock_service().await;
    let store = store(url, "wrong");

    let err = store
        .add(NewMemory::new(
            user("alice"),
            "hello",
            MemoryMetadata::new("customer-support", MemoryRole::User),
        ))
        .await
        .unwrap_err();
    match err {
        MemoryError::Status { status, .. } => assert_eq!(status, 401),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_search_body_is_malformed() {
    let router = Router::new().route("/v1/memories/search/", post(|| async { "<html>oops</html>" }));
    let url = spawn_service(router).await;
    let store = store(url, "secret");

    let err = store
        .search(&user("alice"), "phone", SearchOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_malformed());
}

#[tokio::test]
async fn add_accepts_plain_text_acknowledgement() {
    let router = Router::new().route("/v1/memories/", post(|| async { "OK" }));
    let url = spawn_service(router).await;
    let store = store(url, "secret");

    store
        .add(NewMemory::new(
            user("alice"),
            "where is my order?",
            MemoryMetadata::new("customer-support", MemoryRole::User),
        ))
        .await
        .expect("2xx with a text body is a successful write");
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let store = store(format!("http://{addr}"), "secret");

    let err = store.get_all(&user("alice")).await.unwrap_err();
    assert!(matches!(err, MemoryError::Http(_)));
    assert!(!err.is_malformed());
}
