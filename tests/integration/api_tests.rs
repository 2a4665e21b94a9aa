//! API integration tests, driven in-process through the router

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use elidune_circulation::{api, config::AppConfig, AppState};

const BASE_URL: &str = "/api/v1";

fn app() -> Router {
    api::router(AppState::new(AppConfig::default()))
}

async fn send(
    app: &Router,
    method: Method,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(format!("{}{}", BASE_URL, path));
    let body = match body {
        Some(body) => {
            request = request.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).expect("Failed to build request"))
        .await
        .expect("Failed to send request");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, value)
}

async fn open_account(app: &Router, username: &str) -> u64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/accounts",
        Some(json!({ "username": username })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_u64().expect("No id in response")
}

async fn add_item(app: &Router, title: &str, quantity: u32) -> u64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/items",
        Some(json!({ "title": title, "author": "Herbert", "quantity": quantity })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_u64().expect("No id in response")
}

async fn borrow(app: Router, title: &str, account_id: u64) -> (StatusCode, Value) {
    send(
        &app,
        Method::POST,
        "/loans/borrow",
        Some(json!({ "title": title, "account_id": account_id })),
    )
    .await
}

async fn return_item(app: &Router, title: &str, account_id: u64) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/loans/return",
        Some(json!({ "title": title, "account_id": account_id })),
    )
    .await
}

async fn held(app: &Router, account_id: u64) -> Value {
    let path = format!("/accounts/{}/loans", account_id);
    let (status, body) = send(app, Method::GET, &path, None).await;
    assert!(status.is_success());
    body["items"].clone()
}

async fn wait_for_stock_waiters(app: &Router, n: u64) {
    for _ in 0..500 {
        let (_, body) = send(app, Method::GET, "/diagnostics/snapshot", None).await;
        if body["stock_waiters"] == n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {} suspended borrows", n);
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert!(status.is_success());
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert!(status.is_success());
    assert_eq!(body["stock_waiters"], 0);
}

#[tokio::test]
async fn test_item_lifecycle() {
    let app = app();
    let id = add_item(&app, "Dune", 2).await;

    let (status, body) = send(&app, Method::GET, "/items", None).await;
    assert!(status.is_success());
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], id);

    let (status, body) = send(&app, Method::GET, "/items/Dune/availability", None).await;
    assert!(status.is_success());
    assert_eq!(body["count"], 2);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/items/Dune",
        Some(json!({ "title": "Dune Messiah", "author": "F. Herbert", "quantity": 4 })),
    )
    .await;
    assert!(status.is_success());
    assert_eq!(body["id"], id);
    assert_eq!(body["count"], 4);

    let (status, _) = send(&app, Method::GET, "/items/Dune", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/items/Dune%20Messiah", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::DELETE, "/items/Dune%20Messiah", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchItem");
}

#[tokio::test]
async fn test_batch_update() {
    let app = app();
    add_item(&app, "A", 1).await;
    add_item(&app, "B", 1).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/items",
        Some(json!({ "updates": [
            { "current_title": "A", "edit": { "title": "A2", "author": "x", "quantity": 3 } },
            { "current_title": "B", "edit": { "title": "B2", "author": "y", "quantity": 0 } }
        ]})),
    )
    .await;
    assert!(status.is_success());
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[1]["title"], "B2");
}

#[tokio::test]
async fn test_create_item_validation() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/items",
        Some(json!({ "title": "", "author": "Nobody", "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_borrow_and_return() {
    let app = app();
    let id = add_item(&app, "Dune", 1).await;
    let a = open_account(&app, "alice").await;
    let c = open_account(&app, "carol").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/loans/borrow",
        Some(json!({ "title": "Dune", "account_id": a })),
    )
    .await;
    assert!(status.is_success());
    assert_eq!(body["item_id"], id);
    assert_eq!(body["remaining"], 0);

    let (_, body) = send(&app, Method::GET, &format!("/accounts/{}/loans", a), None).await;
    assert_eq!(body["items"], json!([id]));

    // Someone who never borrowed it cannot return it.
    let (status, body) = send(
        &app,
        Method::POST,
        "/loans/return",
        Some(json!({ "title": "Dune", "account_id": c })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "NotBorrowedByCaller");

    let (status, body) = send(
        &app,
        Method::POST,
        "/loans/return",
        Some(json!({ "title": "Dune", "account_id": a })),
    )
    .await;
    assert!(status.is_success());
    assert_eq!(body["remaining"], 1);
}

#[tokio::test]
async fn test_borrow_wait_times_out() {
    let app = app();
    add_item(&app, "Dune", 0).await;
    let a = open_account(&app, "alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/loans/borrow",
        Some(json!({ "title": "Dune", "account_id": a, "wait_secs": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["error"], "WaitTimeout");
}

#[tokio::test]
async fn test_unknown_account() {
    let app = app();
    add_item(&app, "Dune", 1).await;

    let (status, _) = send(&app, Method::GET, "/accounts/77", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::POST,
        "/loans/borrow",
        Some(json!({ "title": "Dune", "account_id": 77 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchAccount");
}

#[tokio::test]
async fn test_diagnostics() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/diagnostics/lock", None).await;
    assert!(status.is_success());
    assert_eq!(body, json!("free"));

    let (status, body) = send(&app, Method::GET, "/diagnostics/deadlock", None).await;
    assert!(status.is_success());
    assert_eq!(body["status"], "clear");

    let (status, body) = send(&app, Method::GET, "/diagnostics/snapshot", None).await;
    assert!(status.is_success());
    assert_eq!(body["writer_active"], false);
}

#[tokio::test]
async fn test_suspended_borrow_woken_by_return() {
    let app = app();
    let id = add_item(&app, "Dune", 1).await;
    let a = open_account(&app, "alice").await;
    let b = open_account(&app, "bob").await;

    let (status, _) = borrow(app.clone(), "Dune", a).await;
    assert!(status.is_success());

    let waiter = tokio::spawn(borrow(app.clone(), "Dune", b));
    wait_for_stock_waiters(&app, 1).await;
    assert!(!waiter.is_finished());

    let (status, body) = return_item(&app, "Dune", a).await;
    assert!(status.is_success());
    assert_eq!(body["remaining"], 1);

    let (status, body) = waiter.await.expect("Borrow task failed");
    assert!(status.is_success());
    assert_eq!(body["item_id"], id);
    assert_eq!(body["remaining"], 0);

    assert_eq!(held(&app, a).await, json!([]));
    assert_eq!(held(&app, b).await, json!([id]));
}

#[tokio::test]
async fn test_abandoned_borrow_takes_nothing() {
    let app = app();
    add_item(&app, "Dune", 1).await;
    let a = open_account(&app, "alice").await;
    let b = open_account(&app, "bob").await;

    let (status, _) = borrow(app.clone(), "Dune", a).await;
    assert!(status.is_success());

    // The client gives up while its borrow is suspended.
    let waiter = tokio::spawn(borrow(app.clone(), "Dune", b));
    wait_for_stock_waiters(&app, 1).await;
    waiter.abort();
    assert!(waiter.await.unwrap_err().is_cancelled());
    wait_for_stock_waiters(&app, 0).await;

    let (status, _) = return_item(&app, "Dune", a).await;
    assert!(status.is_success());

    let (_, body) = send(&app, Method::GET, "/items/Dune/availability", None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(held(&app, b).await, json!([]));
}

#[test]
fn test_suspended_borrows_do_not_starve_return() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .max_blocking_threads(2)
        .enable_all()
        .build()
        .expect("Failed to build runtime");

    runtime.block_on(async {
        let app = app();
        let id = add_item(&app, "Dune", 1).await;
        let a = open_account(&app, "alice").await;
        let b = open_account(&app, "bob").await;
        let c = open_account(&app, "carol").await;

        let (status, _) = borrow(app.clone(), "Dune", a).await;
        assert!(status.is_success());

        // As many suspended borrows as there are blocking threads.
        let mut waiters: Vec<_> = [b, c]
            .into_iter()
            .map(|account| tokio::spawn(borrow(app.clone(), "Dune", account)))
            .collect();
        wait_for_stock_waiters(&app, 2).await;

        let (status, _) = tokio::time::timeout(
            Duration::from_secs(3),
            return_item(&app, "Dune", a),
        )
        .await
        .expect("Return never ran while borrows were suspended");
        assert!(status.is_success());

        let mut finished = None;
        for _ in 0..300 {
            finished = waiters.iter().position(|waiter| waiter.is_finished());
            if finished.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let winner = waiters.remove(finished.expect("No suspended borrow was granted"));
        let (status, body) = winner.await.expect("Borrow task failed");
        assert!(status.is_success());
        assert_eq!(body["item_id"], id);
        let granted = body["account_id"].as_u64().expect("No account in receipt");
        let other = if granted == b { c } else { b };

        // The other borrow goes back to waiting and is then given up on.
        wait_for_stock_waiters(&app, 1).await;
        for waiter in waiters {
            waiter.abort();
        }
        wait_for_stock_waiters(&app, 0).await;

        assert_eq!(held(&app, granted).await, json!([id]));
        assert_eq!(held(&app, other).await, json!([]));
        assert_eq!(held(&app, a).await, json!([]));
    });
}
