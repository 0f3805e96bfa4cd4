//! API tests driving the router over the in-memory store

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, SecondsFormat, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use rentrack_server::{
    api,
    config::AppConfig,
    models::Borrower,
    repository::memory::{MemoryBorrowerDirectory, MemoryStore},
    services::{RentalRules, Services},
    AppState,
};

const BORROWER: i64 = 7;

async fn test_app() -> Router {
    let borrowers = MemoryBorrowerDirectory::new();
    borrowers
        .insert(Borrower {
            id: BORROWER,
            login: "jdoe".to_string(),
            firstname: None,
            lastname: None,
        })
        .await;
    let config = AppConfig::default();
    let services = Services::new(
        Arc::new(MemoryStore::new()),
        Arc::new(borrowers),
        RentalRules::from(&config.rentals),
    );
    api::create_router(AppState {
        services: Arc::new(services),
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request"),
        None => builder.body(Body::empty()).expect("Failed to build request"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, value)
}

async fn register_camera(app: &Router, serial: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/equipment",
        Some(json!({
            "name": "Camera",
            "category": "Video",
            "serialNumber": serial,
            "currentStatus": "MAINTENANCE"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().expect("No id in response")
}

fn return_date(days: i64) -> String {
    (Utc::now() + Duration::days(days)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, "GET", "/api/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_create_equipment() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/equipment",
        Some(json!({"name": "Camera", "category": "Video", "serialNumber": "CAM001"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Camera");
    assert_eq!(body["category"], "Video");
    assert_eq!(body["currentStatus"], "AVAILABLE");
    assert_eq!(body["condition"], "EXCELLENT");
}

#[tokio::test]
async fn test_create_equipment_duplicate_serial() {
    let app = test_app().await;
    register_camera(&app, "CAM001").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/equipment",
        Some(json!({"name": "Other", "category": "Video", "serialNumber": "CAM001"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Duplicate");
}

#[tokio::test]
async fn test_checkout_return_lifecycle() {
    let app = test_app().await;
    let id = register_camera(&app, "CAM001").await;

    let uri = format!(
        "/api/equipment/checkout?equipmentId={}&userId={}&returnDate={}",
        id,
        BORROWER,
        return_date(7)
    );
    let (status, body) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));

    let (_, body) = send(&app, "GET", &format!("/api/equipment/{}", id), None).await;
    assert_eq!(body["currentStatus"], "CHECKED_OUT");

    // Second checkout is refused
    let (status, body) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "InvalidState");

    // Maintenance cannot preempt the rental
    let (status, _) = send(&app, "POST", &format!("/api/equipment/{}/maintenance", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/equipment/return?equipmentId={}&condition=GOOD", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));

    let (_, body) = send(&app, "GET", "/api/equipment/available", None).await;
    assert_eq!(body[0]["id"], id);
    assert_eq!(body[0]["condition"], "GOOD");

    let (status, body) = send(&app, "GET", &format!("/api/users/{}/rentals", BORROWER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["status"], "RETURNED");
    assert!(body[0]["actualReturnDate"].is_string());
}

#[tokio::test]
async fn test_checkout_accepts_local_date_time() {
    let app = test_app().await;
    let id = register_camera(&app, "CAM001").await;
    let local = (Utc::now() + Duration::days(7))
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S%.3f")
        .to_string();

    let uri = format!(
        "/api/equipment/checkout?equipmentId={}&userId={}&returnDate={}",
        id, BORROWER, local
    );
    let (status, _) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_checkout_failures() {
    let app = test_app().await;
    let id = register_camera(&app, "CAM001").await;

    let unknown_user = format!(
        "/api/equipment/checkout?equipmentId={}&userId=99&returnDate={}",
        id,
        return_date(7)
    );
    let (status, _) = send(&app, "POST", &unknown_user, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let unknown_equipment = format!(
        "/api/equipment/checkout?equipmentId=999&userId={}&returnDate={}",
        BORROWER,
        return_date(7)
    );
    let (status, _) = send(&app, "POST", &unknown_equipment, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let past = format!(
        "/api/equipment/checkout?equipmentId={}&userId={}&returnDate={}",
        id,
        BORROWER,
        return_date(-1)
    );
    let (status, body) = send(&app, "POST", &past, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
}

#[tokio::test]
async fn test_malformed_requests_use_error_body() {
    let app = test_app().await;
    let id = register_camera(&app, "CAM001").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/equipment/return?equipmentId={}&condition=BROKEN", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");
    assert_eq!(body["code"], 18);

    let (status, body) = send(&app, "POST", "/api/equipment/checkout?equipmentId=1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let (status, body) = send(&app, "GET", "/api/equipment/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let (status, body) = send(
        &app,
        "POST",
        "/api/equipment",
        Some(json!({"name": "Camera", "category": "Video"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    // Nothing changed
    let (_, body) = send(&app, "GET", &format!("/api/equipment/{}", id), None).await;
    assert_eq!(body["currentStatus"], "AVAILABLE");
}

#[tokio::test]
async fn test_return_without_rental() {
    let app = test_app().await;
    let id = register_camera(&app, "CAM001").await;
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/equipment/return?equipmentId={}&condition=NEEDS_MAINTENANCE", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "NoActiveRental");
}

#[tokio::test]
async fn test_maintenance_is_idempotent() {
    let app = test_app().await;
    let id = register_camera(&app, "CAM001").await;
    let uri = format!("/api/equipment/{}/maintenance", id);

    for _ in 0..2 {
        let (status, body) = send(&app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!(true));
    }

    let (_, body) = send(&app, "GET", &format!("/api/equipment/{}", id), None).await;
    assert_eq!(body["currentStatus"], "MAINTENANCE");
    assert!(body["lastMaintenanceDate"].is_string());

    let (_, body) = send(&app, "GET", "/api/equipment/available", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_search_equipment() {
    let app = test_app().await;
    register_camera(&app, "CAM001").await;
    send(
        &app,
        "POST",
        "/api/equipment",
        Some(json!({"name": "Tripod", "category": "Support", "serialNumber": "TRI001"})),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/equipment/search?category=Video", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["name"], "Camera");

    let (_, body) = send(&app, "GET", "/api/equipment/search", None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (status, body) = send(&app, "GET", "/api/equipment/search?category=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_overdue_report() {
    let app = test_app().await;
    let id = register_camera(&app, "CAM001").await;
    let uri = format!(
        "/api/equipment/checkout?equipmentId={}&userId={}&returnDate={}",
        id,
        BORROWER,
        return_date(2)
    );
    send(&app, "POST", &uri, None).await;

    let (status, body) = send(&app, "GET", "/api/equipment/rentals/overdue", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/equipment/rentals/overdue?now={}", return_date(3)),
        None,
    )
    .await;
    assert_eq!(body[0]["equipmentId"], id);
    assert_eq!(body[0]["status"], "ACTIVE");
}
