use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use berita_ner::scrape::{browser::BrowserStrategy, ExtractionStrategy, StrategyError};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone, Copy)]
enum Navigation {
    Loads,
    Fails,
    Hangs,
}

#[derive(Clone)]
struct Driver {
    navigation: Navigation,
    has_body: bool,
    deletes: Arc<AtomicUsize>,
}

type Reply = (StatusCode, Json<Value>);

fn driver_error(status: StatusCode, error: &str, message: &str) -> Reply {
    (
        status,
        Json(json!({ "value": { "error": error, "message": message } })),
    )
}

async fn new_session() -> Json<Value> {
    Json(json!({ "value": { "sessionId": "s1", "capabilities": {} } }))
}

async fn navigate(State(driver): State<Driver>) -> Reply {
    match driver.navigation {
        Navigation::Loads => (StatusCode::OK, Json(json!({ "value": null }))),
        Navigation::Fails => driver_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "unknown error",
            "net::ERR_NAME_NOT_RESOLVED",
        ),
        Navigation::Hangs => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            (StatusCode::OK, Json(json!({ "value": null })))
        }
    }
}

async fn find_element(State(driver): State<Driver>) -> Reply {
    if driver.has_body {
        (
            StatusCode::OK,
            Json(json!({ "value": { "element-6066-11e4-a52e-4f735466cecf": "e1" } })),
        )
    } else {
        driver_error(StatusCode::NOT_FOUND, "no such element", "body")
    }
}

async fn page_source() -> Json<Value> {
    Json(json!({
        "value": "<html><body><article><p>Gempa mengguncang Cianjur.</p></article></body></html>"
    }))
}

async fn delete_session(State(driver): State<Driver>) -> Json<Value> {
    driver.deletes.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "value": null }))
}

/// Start a fake WebDriver endpoint and return its URL plus the DELETE counter.
async fn spawn_driver(navigation: Navigation, has_body: bool) -> (String, Arc<AtomicUsize>) {
    let deletes = Arc::new(AtomicUsize::new(0));
    let driver = Driver {
        navigation,
        has_body,
        deletes: deletes.clone(),
    };
    let app = Router::new()
        .route("/session", post(new_session))
        .route("/session/:id/url", post(navigate))
        .route("/session/:id/element", post(find_element))
        .route("/session/:id/source", get(page_source))
        .route("/session/:id", delete(delete_session))
        .with_state(driver);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), deletes)
}

fn strategy(endpoint: String) -> BrowserStrategy {
    BrowserStrategy::new(
        Some(endpoint),
        "test-agent".into(),
        Duration::from_secs(2),
        Duration::from_millis(300),
        Duration::from_millis(10),
    )
    .unwrap()
}

const PAGE: &str = "https://news.example.id/berita/gempa";

async fn settle() {
    tokio::time::sleep(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn successful_render_deletes_session_once() {
    let (endpoint, deletes) = spawn_driver(Navigation::Loads, true).await;
    let text = strategy(endpoint).extract(PAGE).await.unwrap();
    assert_eq!(text, "Gempa mengguncang Cianjur.");
    settle().await;
    assert_eq!(deletes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn navigation_error_deletes_session_once() {
    let (endpoint, deletes) = spawn_driver(Navigation::Fails, true).await;
    let err = strategy(endpoint).extract(PAGE).await.unwrap_err();
    assert!(matches!(err, StrategyError::Browser(_)), "{err}");
    settle().await;
    assert_eq!(deletes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_body_times_out_and_deletes_session_once() {
    let (endpoint, deletes) = spawn_driver(Navigation::Loads, false).await;
    let err = strategy(endpoint).extract(PAGE).await.unwrap_err();
    assert_eq!(err, StrategyError::Timeout);
    settle().await;
    assert_eq!(deletes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancelled_extraction_still_deletes_session() {
    let (endpoint, deletes) = spawn_driver(Navigation::Hangs, true).await;
    let browser = strategy(endpoint);
    let outcome = tokio::time::timeout(Duration::from_millis(500), browser.extract(PAGE)).await;
    assert!(outcome.is_err());

    for _ in 0..40 {
        if deletes.load(Ordering::SeqCst) > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    settle().await;
    assert_eq!(deletes.load(Ordering::SeqCst), 1);
}
