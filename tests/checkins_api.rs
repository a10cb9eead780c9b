use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use checkin_api::auth::jwt::Claims;
use checkin_api::clock::ManualClock;
use checkin_api::config::Config;
use checkin_api::db::MemoryCheckinRepository;
use checkin_api::services::{CheckinService, DailyUniquenessGuard};
use checkin_api::AppState;

const JWT_SECRET: &str = "integration-test-jwt-secret";

struct TestApp {
    router: Router,
    clock: Arc<ManualClock>,
}

fn day_d() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap()
}

fn test_app() -> TestApp {
    let config = Config::from_lookup(|name| match name {
        "CHECKIN_STORE" => Some("memory".into()),
        "JWT_SECRET" => Some(JWT_SECRET.into()),
        "ENCRYPTION_KEY" => Some("integration-test-encryption-secret".into()),
        _ => None,
    })
    .unwrap();

    let checkins = CheckinService::new(
        Arc::new(MemoryCheckinRepository::new()),
        Arc::new(config.journal_key.clone()),
        DailyUniquenessGuard::new(config.day_offset),
    );
    let clock = Arc::new(ManualClock::new(day_d()));

    let state = AppState {
        config: Arc::new(config),
        checkins,
        clock: clock.clone(),
    };

    TestApp {
        router: checkin_api::app(state),
        clock,
    }
}

fn bearer(user: Uuid) -> String {
    let claims = Claims {
        sub: user,
        exp: (Utc::now() + Duration::hours(1)).timestamp(),
        iat: None,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {token}")
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn create(app: &TestApp, user: Uuid, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/checkins")
        .header(header::AUTHORIZATION, bearer(user))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn list(app: &TestApp, user: Uuid, query: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/api/checkins{query}"))
        .header(header::AUTHORIZATION, bearer(user))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

fn good_day() -> Value {
    json!({ "moodRating": 8, "stressLevel": "Low", "journalEntry": "Good day" })
}

fn error_fields(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn create_returns_public_projection() {
    let app = test_app();
    let (status, body) = create(&app, Uuid::new_v4(), good_day()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_string());
    assert_eq!(body["moodRating"], 8);
    assert_eq!(body["stressLevel"], "Low");
    assert!(body["date"].is_string());
    assert!(body.get("journalEntry").is_none());
    assert!(body.get("journalCipher").is_none());
}

#[tokio::test]
async fn duplicate_same_day_then_next_day_succeeds() {
    let app = test_app();
    let user = Uuid::new_v4();

    let (status, _) = create(&app, user, good_day()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = create(&app, user, good_day()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["code"], "duplicate_checkin");
    assert_eq!(body["errors"][0]["message"], "You have already checked in today");

    app.clock.advance(Duration::days(1));
    let (status, _) = create(&app, user, good_day()).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn duplicate_ignores_differing_content() {
    let app = test_app();
    let user = Uuid::new_v4();

    create(&app, user, good_day()).await;
    app.clock.advance(Duration::hours(12));

    let (status, body) = create(
        &app,
        user,
        json!({ "moodRating": 2, "stressLevel": "High", "journalEntry": "Rough evening" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["code"], "duplicate_checkin");
}

#[tokio::test]
async fn mood_out_of_range_is_rejected() {
    let app = test_app();
    let (status, body) = create(
        &app,
        Uuid::new_v4(),
        json!({ "moodRating": 11, "stressLevel": "Low", "journalEntry": "Good day" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["moodRating"]);
}

#[tokio::test]
async fn blank_journal_is_rejected() {
    let app = test_app();
    let (status, body) = create(
        &app,
        Uuid::new_v4(),
        json!({ "moodRating": 5, "stressLevel": "Medium", "journalEntry": "   " }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["journalEntry"]);
}

#[tokio::test]
async fn rejected_submission_does_not_use_up_the_day() {
    let app = test_app();
    let user = Uuid::new_v4();

    let (status, _) = create(
        &app,
        user,
        json!({ "moodRating": 0, "stressLevel": "Low", "journalEntry": "x" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = create(&app, user, good_day()).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/checkins")
        .header(header::AUTHORIZATION, bearer(Uuid::new_v4()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["body"]);
}

#[tokio::test]
async fn requests_without_a_valid_token_are_unauthorized() {
    let app = test_app();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/checkins")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/checkins")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(good_day().to_string()))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], 401);
}

#[tokio::test]
async fn history_is_decrypted_scoped_and_newest_first() {
    let app = test_app();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    for (mood, note) in [(3, "monday"), (6, "tuesday"), (9, "wednesday")] {
        let (status, _) = create(
            &app,
            alice,
            json!({ "moodRating": mood, "stressLevel": "Medium", "journalEntry": note }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = create(
            &app,
            bob,
            json!({ "moodRating": 1, "stressLevel": "High", "journalEntry": "bob's secret" }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        app.clock.advance(Duration::days(1));
    }

    let (status, body) = list(&app, alice, "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);

    let journals: Vec<&str> = body["checkins"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["journalEntry"].as_str().unwrap())
        .collect();
    assert_eq!(journals, vec!["wednesday", "tuesday", "monday"]);

    let (_, bob_body) = list(&app, bob, "").await;
    assert_eq!(bob_body["total"], 3);
    assert!(bob_body["checkins"]
        .as_array()
        .unwrap()
        .iter()
        .all(|c| c["journalEntry"] == "bob's secret"));
}

#[tokio::test]
async fn paging_does_not_change_total() {
    let app = test_app();
    let user = Uuid::new_v4();

    for mood in 1..=4 {
        create(
            &app,
            user,
            json!({ "moodRating": mood, "stressLevel": "Low", "journalEntry": "entry" }),
        )
        .await;
        app.clock.advance(Duration::days(1));
    }

    let (status, body) = list(&app, user, "?limit=2&skip=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);

    let moods: Vec<i64> = body["checkins"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["moodRating"].as_i64().unwrap())
        .collect();
    assert_eq!(moods, vec![3, 2]);
}

#[tokio::test]
async fn empty_history_lists_nothing() {
    let app = test_app();
    let (status, body) = list(&app, Uuid::new_v4(), "").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "checkins": [], "total": 0 }));
}

#[tokio::test]
async fn short_route_alias_is_served() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/checkins")
        .header(header::AUTHORIZATION, bearer(Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(
        &app,
        Request::builder().uri("/readyz").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn malformed_query_is_a_field_error() {
    let app = test_app();
    let (status, body) = list(&app, Uuid::new_v4(), "?limit=abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["query"]);
    assert_eq!(body["errors"][0]["code"], "malformed");
}

#[tokio::test]
async fn unknown_route_returns_json_not_found() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/nope?x=1")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");
    assert_eq!(body["attempted"], "DELETE /api/nope");
    assert!(body["availableEndpoints"]
        .as_array()
        .unwrap()
        .contains(&json!("POST /api/checkins")));
}
