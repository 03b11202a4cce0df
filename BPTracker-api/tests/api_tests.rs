use std::sync::Once;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bp_tracker_api::create_app;
use bp_tracker_data::database::DatabasePool;

// Ensure tracing is initialized only once
static INIT: Once = Once::new();

fn initialize() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

fn test_app() -> Router {
    initialize();
    create_app(DatabasePool::sqlite_in_memory().expect("in-memory database"))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, reading) = send(app, Method::POST, "/readings/", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", reading);
    reading
}

#[tokio::test]
async fn test_root_and_health() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "BPTracker API is running"}));

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["status"], "ok");
}

#[tokio::test]
async fn test_create_then_get_returns_same_values() {
    let app = test_app();

    for (systolic, diastolic, heart_rate) in [(40, 20, 20), (120, 80, 72), (300, 200, 250)] {
        let created = create(
            &app,
            json!({
                "systolic": systolic,
                "diastolic": diastolic,
                "heart_rate": heart_rate,
                "timestamp": "2024-03-15T08:30:05.123456Z"
            }),
        )
        .await;

        let id = created["id"].as_i64().unwrap();
        let (status, fetched) = send(&app, Method::GET, &format!("/readings/{}", id), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
        assert_eq!(fetched["systolic"], systolic);
        assert_eq!(fetched["diastolic"], diastolic);
        assert_eq!(fetched["heart_rate"], heart_rate);
        assert_eq!(fetched["timestamp"], "2024-03-15T08:30:05.123456Z");
    }
}

#[tokio::test]
async fn test_create_without_timestamp_uses_now() {
    let app = test_app();

    let created = create(&app, json!({"systolic": 118, "diastolic": 76, "heart_rate": 64})).await;
    let timestamp = created["timestamp"].as_str().unwrap();

    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn test_systolic_bounds() {
    let app = test_app();

    create(&app, json!({"systolic": 300, "diastolic": 80, "heart_rate": 70})).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/readings/",
        Some(json!({"systolic": 301, "diastolic": 80, "heart_rate": 70})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"][0].as_str().unwrap().starts_with("systolic"));
}

#[tokio::test]
async fn test_malformed_body_is_unprocessable() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/readings/",
        Some(json!({"systolic": "high", "diastolic": 80, "heart_rate": 70})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = send(
        &app,
        Method::POST,
        "/readings/",
        Some(json!({"systolic": 120, "diastolic": 80})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_list_is_newest_first_and_bounded() {
    let app = test_app();

    for day in [3, 1, 4, 2, 5] {
        create(
            &app,
            json!({
                "systolic": 120,
                "diastolic": 80,
                "heart_rate": 70,
                "timestamp": format!("2024-01-0{} 07:00:00", day)
            }),
        )
        .await;
    }

    let (status, body) = send(&app, Method::GET, "/readings/?skip=0&limit=3", None).await;
    assert_eq!(status, StatusCode::OK);

    let readings = body["readings"].as_array().unwrap();
    assert_eq!(readings.len(), 3);
    let timestamps: Vec<&str> = readings.iter().map(|r| r["timestamp"].as_str().unwrap()).collect();
    assert_eq!(
        timestamps,
        vec!["2024-01-05T07:00:00Z", "2024-01-04T07:00:00Z", "2024-01-03T07:00:00Z"]
    );

    let (_, body) = send(&app, Method::GET, "/readings?skip=3", None).await;
    assert_eq!(body["readings"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_rejects_bad_window() {
    let app = test_app();

    for query in ["skip=-1", "limit=0", "limit=101", "limit=ten"] {
        let (status, body) = send(&app, Method::GET, &format!("/readings/?{}", query), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "query {}", query);
        assert_eq!(body["error"], "validation_error");
    }
}

#[tokio::test]
async fn test_large_skip_is_an_empty_page() {
    let app = test_app();
    create(&app, json!({"systolic": 120, "diastolic": 80, "heart_rate": 70})).await;

    let (status, body) = send(&app, Method::GET, "/readings/?skip=3000000000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"readings": []}));
}

#[tokio::test]
async fn test_five_digit_year_is_rejected() {
    let app = test_app();

    create(
        &app,
        json!({"systolic": 120, "diastolic": 80, "heart_rate": 70, "timestamp": "2024-01-01T00:00:00"}),
    )
    .await;
    create(
        &app,
        json!({"systolic": 121, "diastolic": 81, "heart_rate": 71, "timestamp": "9999-12-31T23:59:59"}),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/readings/",
        Some(json!({"systolic": 122, "diastolic": 82, "heart_rate": 72, "timestamp": "+10000-01-01T00:00:00"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    let (_, body) = send(&app, Method::GET, "/readings/", None).await;
    let timestamps: Vec<&str> = body["readings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["timestamp"].as_str().unwrap())
        .collect();
    assert_eq!(timestamps, vec!["9999-12-31T23:59:59Z", "2024-01-01T00:00:00Z"]);
}

#[tokio::test]
async fn test_cors_mirrors_origin_with_credentials() {
    let app = test_app();
    let origin = "http://localhost:5173";

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/readings/")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type, x-custom-header")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(preflight).await.unwrap();

    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], origin);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "content-type, x-custom-header"
    );

    let simple = Request::builder()
        .method(Method::GET)
        .uri("/readings/")
        .header(header::ORIGIN, origin)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(simple).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], origin);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn test_missing_reading_is_not_found() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/readings/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Reading not found");

    let (status, _) = send(&app, Method::DELETE, "/readings/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/readings/abc", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_delete_one_and_all() {
    let app = test_app();

    let first = create(&app, json!({"systolic": 120, "diastolic": 80, "heart_rate": 70})).await;
    create(&app, json!({"systolic": 125, "diastolic": 82, "heart_rate": 71})).await;

    let uri = format!("/readings/{}", first["id"]);
    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/readings/", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, "/readings/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"readings": []}));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "BPTracker API");
    assert!(body["paths"]["/readings/{reading_id}"].is_object());
}
