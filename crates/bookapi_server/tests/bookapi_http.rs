//! End-to-end tests for the `/bookapi` endpoints.
//!
//! Each test starts the router on an ephemeral port backed by a fresh
//! in-memory database and talks to it with reqwest.

use bookapi_core::db::{open_db, open_db_in_memory};
use bookapi_core::BookStore;
use bookapi_server::{build_router, ServerConfig};
use reqwest::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD,
    CONTENT_TYPE, ORIGIN,
};
use reqwest::{Client, StatusCode};
use rusqlite::Connection;
use serde_json::{json, Value};

const FRONTEND_ORIGIN: &str = "http://localhost:5174";

async fn start_server(store: BookStore) -> String {
    let app = build_router(store, &ServerConfig::default()).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/bookapi")
}

async fn start_in_memory() -> String {
    start_server(BookStore::new(open_db_in_memory().unwrap()).unwrap()).await
}

fn book(id: i32, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "author": "X",
        "publisher": "P",
        "year": 2020,
        "genre": "G"
    })
}

async fn add(client: &Client, base: &str, body: &Value) -> Value {
    let resp = client
        .post(format!("{base}/add"))
        .json(body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.unwrap()
}

async fn get_json(client: &Client, url: String) -> Value {
    let resp = client.get(url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");
    resp.json().await.unwrap()
}

#[tokio::test]
async fn add_then_get_roundtrips_the_body() {
    let base = start_in_memory().await;
    let client = Client::new();
    let body = book(1, "A");

    assert_eq!(add(&client, &base, &body).await, body);
    assert_eq!(get_json(&client, format!("{base}/1")).await, body);
}

#[tokio::test]
async fn get_unknown_id_returns_null() {
    let base = start_in_memory().await;
    let client = Client::new();

    let resp = client.get(format!("{base}/999")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "null");
}

#[tokio::test]
async fn add_with_same_id_overwrites() {
    let base = start_in_memory().await;
    let client = Client::new();

    add(&client, &base, &book(1, "A")).await;
    add(&client, &base, &book(1, "B")).await;

    let all = get_json(&client, format!("{base}/all")).await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0]["title"], "B");
}

#[tokio::test]
async fn list_returns_every_added_book() {
    let base = start_in_memory().await;
    let client = Client::new();

    assert_eq!(get_json(&client, format!("{base}/all")).await, json!([]));

    for id in [3, 1, 2] {
        add(&client, &base, &book(id, &format!("t{id}"))).await;
    }

    let all = get_json(&client, format!("{base}/all")).await;
    let mut ids: Vec<i64> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn update_overwrites_fields_and_keeps_path_id() {
    let base = start_in_memory().await;
    let client = Client::new();
    add(&client, &base, &book(5, "Old")).await;

    let resp = client
        .put(format!("{base}/update/5"))
        .json(&json!({
            "id": 77,
            "title": "New",
            "author": "A2",
            "publisher": "P2",
            "year": 2021,
            "genre": "G2"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let expected = json!({
        "id": 5,
        "title": "New",
        "author": "A2",
        "publisher": "P2",
        "year": 2021,
        "genre": "G2"
    });
    assert_eq!(resp.json::<Value>().await.unwrap(), expected);
    assert_eq!(get_json(&client, format!("{base}/5")).await, expected);
    assert_eq!(get_json(&client, format!("{base}/77")).await, Value::Null);
}

#[tokio::test]
async fn update_unknown_id_returns_null_and_writes_nothing() {
    let base = start_in_memory().await;
    let client = Client::new();

    let resp = client
        .put(format!("{base}/update/9"))
        .json(&book(9, "Ghost"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "null");

    assert_eq!(get_json(&client, format!("{base}/all")).await, json!([]));
}

#[tokio::test]
async fn delete_is_idempotent_and_returns_plain_text() {
    let base = start_in_memory().await;
    let client = Client::new();

    for _ in 0..2 {
        let resp = client
            .delete(format!("{base}/delete/7"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(resp.text().await.unwrap(), "Book deleted with id 7");
    }
}

#[tokio::test]
async fn delete_removes_an_existing_book() {
    let base = start_in_memory().await;
    let client = Client::new();
    add(&client, &base, &book(4, "Doomed")).await;

    client
        .delete(format!("{base}/delete/4"))
        .send()
        .await
        .unwrap();

    assert_eq!(get_json(&client, format!("{base}/4")).await, Value::Null);
}

#[tokio::test]
async fn form_style_string_ids_are_coerced() {
    let base = start_in_memory().await;
    let client = Client::new();

    let stored = add(
        &client,
        &base,
        &json!({"id": "12", "title": "Dune", "author": "", "publisher": "", "year": 1965, "genre": ""}),
    )
    .await;

    assert_eq!(stored["id"], 12);
    assert_eq!(get_json(&client, format!("{base}/12")).await["title"], "Dune");
}

#[tokio::test]
async fn non_integer_path_id_is_bad_request() {
    let base = start_in_memory().await;
    let client = Client::new();

    let resp = client.get(format!("{base}/abc")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .delete(format!("{base}/delete/1.5"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unparseable_body_is_bad_request() {
    let base = start_in_memory().await;
    let client = Client::new();

    let resp = client
        .post(format!("{base}/add"))
        .header(CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(format!("{base}/add"))
        .json(&json!({"id": "seven"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn body_without_json_content_type_is_unsupported_media_type() {
    let base = start_in_memory().await;
    let client = Client::new();

    let resp = client
        .post(format!("{base}/add"))
        .body(book(1, "A").to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    assert_eq!(get_json(&client, format!("{base}/all")).await, json!([]));
}

#[tokio::test]
async fn storage_failure_is_internal_server_error_with_plain_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.sqlite3");
    let base = start_server(BookStore::new(open_db(&path).unwrap()).unwrap()).await;
    let client = Client::new();

    Connection::open(&path)
        .unwrap()
        .execute_batch("DROP TABLE book_table;")
        .unwrap();

    let resp = client.get(format!("{base}/all")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
    let body = resp.text().await.unwrap();
    assert!(body.starts_with("storage unavailable"), "unexpected body: {body}");

    let resp = client
        .post(format!("{base}/add"))
        .json(&book(1, "A"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn fractional_year_is_truncated() {
    let base = start_in_memory().await;
    let client = Client::new();

    let stored = add(
        &client,
        &base,
        &json!({"id": "3", "title": "T", "author": "", "publisher": "", "year": 2020.5, "genre": ""}),
    )
    .await;

    assert_eq!(stored["year"], 2020);
}

#[tokio::test]
async fn preflight_from_frontend_origin_is_allowed() {
    let base = start_in_memory().await;
    let client = Client::new();

    let resp = client
        .request(reqwest::Method::OPTIONS, format!("{base}/all"))
        .header(ORIGIN, FRONTEND_ORIGIN)
        .header(ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .header(ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_success());
    assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], FRONTEND_ORIGIN);
}

#[tokio::test]
async fn actual_request_from_frontend_origin_carries_cors_header() {
    let base = start_in_memory().await;
    let client = Client::new();

    let resp = client
        .get(format!("{base}/all"))
        .header(ORIGIN, FRONTEND_ORIGIN)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], FRONTEND_ORIGIN);
}

#[tokio::test]
async fn other_origins_get_no_cors_grant() {
    let base = start_in_memory().await;
    let client = Client::new();

    let resp = client
        .get(format!("{base}/all"))
        .header(ORIGIN, "http://evil.test")
        .send()
        .await
        .unwrap();

    assert!(resp.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn books_survive_a_server_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.sqlite3");
    let client = Client::new();

    let base = start_server(BookStore::new(open_db(&path).unwrap()).unwrap()).await;
    add(&client, &base, &book(21, "Persisted")).await;

    let restarted = start_server(BookStore::new(open_db(&path).unwrap()).unwrap()).await;
    assert_eq!(
        get_json(&client, format!("{restarted}/21")).await,
        book(21, "Persisted")
    );
}
