use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use trainvault_api::auth::jwt::create_access_token;
use trainvault_api::config::Config;
use trainvault_api::models::daily_workout::DailyWorkout;
use trainvault_api::models::exercise_weight::ExerciseWeight;
use trainvault_api::models::monthly_progress::{MonthlyProgress, NewProgressRecord};
use trainvault_api::models::setting::UserSetting;
use trainvault_api::services::snapshot::snapshot_period;
use trainvault_api::store::{MemoryStore, StoreError, StoreResult, TrainingStore};
use trainvault_api::{build_router, AppState};

const SECRET: &str = "integration-test-secret";

/// Every call fails as if the database were down.
struct UnavailableStore;

fn down<T>() -> StoreResult<T> {
    Err(StoreError::Unavailable("connection refused".into()))
}

#[async_trait]
impl TrainingStore for UnavailableStore {
    async fn ping(&self) -> StoreResult<()> {
        down()
    }
    async fn find_weights(&self, _: Uuid, _: &[String]) -> StoreResult<Vec<ExerciseWeight>> {
        down()
    }
    async fn weights_for_user(&self, _: Uuid) -> StoreResult<Vec<ExerciseWeight>> {
        down()
    }
    async fn all_weights(&self) -> StoreResult<Vec<ExerciseWeight>> {
        down()
    }
    async fn upsert_weight(&self, _: Uuid, _: &str, _: f64) -> StoreResult<ExerciseWeight> {
        down()
    }
    async fn adjust_weight(
        &self,
        _: Uuid,
        _: &str,
        _: f64,
        _: f64,
        _: f64,
    ) -> StoreResult<ExerciseWeight> {
        down()
    }
    async fn upsert_progress(&self, _: &[NewProgressRecord], _: bool) -> StoreResult<u64> {
        down()
    }
    async fn progress_for_user(&self, _: Uuid, _: Option<i32>) -> StoreResult<Vec<MonthlyProgress>> {
        down()
    }
    async fn workouts_between(
        &self,
        _: Uuid,
        _: NaiveDate,
        _: NaiveDate,
    ) -> StoreResult<Vec<DailyWorkout>> {
        down()
    }
    async fn find_workout(&self, _: Uuid, _: NaiveDate) -> StoreResult<Option<DailyWorkout>> {
        down()
    }
    async fn set_workout(
        &self,
        _: Uuid,
        _: NaiveDate,
        _: bool,
        _: Option<&str>,
    ) -> StoreResult<DailyWorkout> {
        down()
    }
    async fn workouts_desc(&self, _: Uuid) -> StoreResult<Vec<DailyWorkout>> {
        down()
    }
    async fn get_setting(&self, _: Uuid, _: &str) -> StoreResult<Option<UserSetting>> {
        down()
    }
    async fn put_setting(&self, _: Uuid, _: &str, _: &str) -> StoreResult<UserSetting> {
        down()
    }
}

/// Reads are served from the wrapped store; every write fails.
struct ReadOnlyStore(MemoryStore);

fn write_failed<T>() -> StoreResult<T> {
    Err(StoreError::Unavailable("write failed".into()))
}

#[async_trait]
impl TrainingStore for ReadOnlyStore {
    async fn ping(&self) -> StoreResult<()> {
        self.0.ping().await
    }
    async fn find_weights(&self, user: Uuid, names: &[String]) -> StoreResult<Vec<ExerciseWeight>> {
        self.0.find_weights(user, names).await
    }
    async fn weights_for_user(&self, user: Uuid) -> StoreResult<Vec<ExerciseWeight>> {
        self.0.weights_for_user(user).await
    }
    async fn all_weights(&self) -> StoreResult<Vec<ExerciseWeight>> {
        self.0.all_weights().await
    }
    async fn upsert_weight(&self, _: Uuid, _: &str, _: f64) -> StoreResult<ExerciseWeight> {
        write_failed()
    }
    async fn adjust_weight(
        &self,
        _: Uuid,
        _: &str,
        _: f64,
        _: f64,
        _: f64,
    ) -> StoreResult<ExerciseWeight> {
        write_failed()
    }
    async fn upsert_progress(&self, _: &[NewProgressRecord], _: bool) -> StoreResult<u64> {
        write_failed()
    }
    async fn progress_for_user(
        &self,
        user: Uuid,
        year: Option<i32>,
    ) -> StoreResult<Vec<MonthlyProgress>> {
        self.0.progress_for_user(user, year).await
    }
    async fn workouts_between(
        &self,
        user: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<DailyWorkout>> {
        self.0.workouts_between(user, start, end).await
    }
    async fn find_workout(&self, user: Uuid, date: NaiveDate) -> StoreResult<Option<DailyWorkout>> {
        self.0.find_workout(user, date).await
    }
    async fn set_workout(
        &self,
        _: Uuid,
        _: NaiveDate,
        _: bool,
        _: Option<&str>,
    ) -> StoreResult<DailyWorkout> {
        write_failed()
    }
    async fn workouts_desc(&self, user: Uuid) -> StoreResult<Vec<DailyWorkout>> {
        self.0.workouts_desc(user).await
    }
    async fn get_setting(&self, user: Uuid, key: &str) -> StoreResult<Option<UserSetting>> {
        self.0.get_setting(user, key).await
    }
    async fn put_setting(&self, _: Uuid, _: &str, _: &str) -> StoreResult<UserSetting> {
        write_failed()
    }
}

fn app_with(store: Arc<dyn TrainingStore>) -> (Router, Arc<Config>) {
    let config = Arc::new(Config::for_secret(SECRET));
    let state = AppState::new(store, config.clone());
    (build_router(state), config)
}

fn bearer(config: &Config, user_id: Uuid) -> String {
    let token = create_access_token(user_id, Some("lifter@example.com"), 3600, config).unwrap();
    format!("Bearer {}", token)
}

fn request(method: Method, uri: &str, auth: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn health_is_public() {
    let (app, _) = app_with(Arc::new(MemoryStore::new()));

    let (status, body) = send(&app, request(Method::GET, "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn api_requires_bearer_token() {
    let (app, _) = app_with(Arc::new(MemoryStore::new()));

    let (status, body) = send(&app, request(Method::GET, "/api/weights", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"]["message"].is_string());

    let (status, _) = send(
        &app,
        request(Method::GET, "/api/weights", Some("Bearer not-a-jwt"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn weights_are_stored_under_canonical_names() {
    let (app, config) = app_with(Arc::new(MemoryStore::new()));
    let auth = bearer(&config, Uuid::new_v4());

    let (status, body) = send(
        &app,
        request(
            Method::PUT,
            "/api/weights",
            Some(&auth),
            Some(json!({ "exercise_name": "rdls", "weight": 80 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exercise_name"], "Back Extension");

    let (status, body) = send(
        &app,
        request(
            Method::GET,
            "/api/weights?exercises=RDL,Legpress",
            Some(&auth),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weights"]["Back Extension"], 80.0);
    assert_eq!(body["weights"]["Legpress"], 0.0);
}

#[tokio::test]
async fn weight_out_of_range_is_rejected() {
    let (app, config) = app_with(Arc::new(MemoryStore::new()));
    let auth = bearer(&config, Uuid::new_v4());

    let (status, body) = send(
        &app,
        request(
            Method::PUT,
            "/api/weights",
            Some(&auth),
            Some(json!({ "exercise_name": "Legpress", "weight": 1500 })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], 422);
}

#[tokio::test]
async fn users_do_not_see_each_others_weights() {
    let (app, config) = app_with(Arc::new(MemoryStore::new()));
    let alice = bearer(&config, Uuid::new_v4());
    let bob = bearer(&config, Uuid::new_v4());

    send(
        &app,
        request(
            Method::PUT,
            "/api/weights",
            Some(&alice),
            Some(json!({ "exercise_name": "Chest Press", "weight": 60 })),
        ),
    )
    .await;

    let (_, body) = send(
        &app,
        request(Method::GET, "/api/weights?exercises=Chest%20Press", Some(&bob), None),
    )
    .await;
    assert_eq!(body["weights"]["Chest Press"], 0.0);
}

#[tokio::test]
async fn training_day_lists_canonical_exercises() {
    let (app, config) = app_with(Arc::new(MemoryStore::new()));
    let auth = bearer(&config, Uuid::new_v4());

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/training-days/lower-b", Some(&auth), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["day"], "lower-b");
    let names: Vec<&str> = body["exercises"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["exercise_name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Back Extension"));
}

#[tokio::test]
async fn toggling_a_day_twice_clears_it() {
    let (app, config) = app_with(Arc::new(MemoryStore::new()));
    let auth = bearer(&config, Uuid::new_v4());
    let toggle = || {
        request(
            Method::POST,
            "/api/calendar/toggle",
            Some(&auth),
            Some(json!({ "date": "2024-09-15", "workout_type": "Upper A" })),
        )
    };

    let (status, body) = send(&app, toggle()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["worked_out"], true);
    assert_eq!(body["month"]["dates"], json!(["2024-09-15"]));

    let (_, body) = send(&app, toggle()).await;
    assert_eq!(body["worked_out"], false);

    let (status, body) = send(
        &app,
        request(
            Method::GET,
            "/api/calendar?year=2024&month=9",
            Some(&auth),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dates"], json!([]));
    assert_eq!(body["last_day"], "2024-09-30");
}

#[tokio::test]
async fn invalid_month_is_a_validation_error() {
    let (app, config) = app_with(Arc::new(MemoryStore::new()));
    let auth = bearer(&config, Uuid::new_v4());

    let (status, _) = send(
        &app,
        request(
            Method::GET,
            "/api/calendar?year=2024&month=13",
            Some(&auth),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn snapshot_feeds_the_progress_table() {
    let (app, config) = app_with(Arc::new(MemoryStore::new()));
    let auth = bearer(&config, Uuid::new_v4());

    send(
        &app,
        request(
            Method::PUT,
            "/api/weights",
            Some(&auth),
            Some(json!({ "exercise_name": "rdls", "weight": 80 })),
        ),
    )
    .await;

    let (year, month) = snapshot_period(Utc::now(), config.reference_timezone);

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/functions/v1/monthly-snapshot",
            Some(&auth),
            Some(json!({ "overwrite": true })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Monthly snapshot completed successfully");
    assert_eq!(body["recordsProcessed"], 1);
    assert_eq!(body["year"], year);
    assert_eq!(body["month"], month);

    let (status, body) = send(
        &app,
        request(
            Method::GET,
            &format!("/api/progress?year={}", year),
            Some(&auth),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["exercise_name"], "Back Extension");
    assert_eq!(rows[0]["months"][(month - 1) as usize], 80.0);
}

#[tokio::test]
async fn snapshot_without_weights_reports_nothing_to_do() {
    let (app, config) = app_with(Arc::new(MemoryStore::new()));
    let auth = bearer(&config, Uuid::new_v4());

    let (status, body) = send(
        &app,
        request(Method::POST, "/functions/v1/monthly-snapshot", Some(&auth), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "No exercise weights found" }));
}

#[tokio::test]
async fn snapshot_preflight_allows_any_origin() {
    let (app, _) = app_with(Arc::new(MemoryStore::new()));

    let response = app
        .oneshot(request(
            Method::OPTIONS,
            "/functions/v1/monthly-snapshot",
            None,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS].to_str().unwrap();
    assert!(allowed.contains("apikey"));
    assert!(allowed.contains("x-client-info"));
}

#[tokio::test]
async fn snapshot_failure_returns_error_message() {
    let (app, config) = app_with(Arc::new(UnavailableStore));
    let auth = bearer(&config, Uuid::new_v4());

    let (status, body) = send(
        &app,
        request(Method::POST, "/functions/v1/monthly-snapshot", Some(&auth), None),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("unavailable"));
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn snapshot_is_rate_limited_per_user() {
    let (app, config) = app_with(Arc::new(MemoryStore::new()));
    let auth = bearer(&config, Uuid::new_v4());
    let run = || request(Method::POST, "/functions/v1/monthly-snapshot", Some(&auth), None);

    for _ in 0..3 {
        let (status, _) = send(&app, run()).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = send(&app, run()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body, json!({ "error": "Rate limited" }));
}

#[tokio::test]
async fn snapshot_rejections_use_the_function_error_shape() {
    let (app, _) = app_with(Arc::new(MemoryStore::new()));

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/functions/v1/monthly-snapshot",
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
    assert!(body["error"].get("message").is_none());
}

#[tokio::test]
async fn store_outage_is_service_unavailable() {
    let (app, config) = app_with(Arc::new(UnavailableStore));
    let auth = bearer(&config, Uuid::new_v4());

    let (status, body) = send(&app, request(Method::GET, "/api/weights", Some(&auth), None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], 503);

    let (status, _) = send(&app, request(Method::GET, "/readyz", None, None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn missing_setting_is_null_not_an_error() {
    let (app, config) = app_with(Arc::new(MemoryStore::new()));
    let auth = bearer(&config, Uuid::new_v4());

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/settings/theme", Some(&auth), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "theme");
    assert!(body["value"].is_null());

    send(
        &app,
        request(
            Method::PUT,
            "/api/settings/theme",
            Some(&auth),
            Some(json!({ "value": "dark" })),
        ),
    )
    .await;
    let (_, body) = send(
        &app,
        request(Method::GET, "/api/settings/theme", Some(&auth), None),
    )
    .await;
    assert_eq!(body["value"], "dark");
}

#[tokio::test]
async fn legacy_function_name_runs_the_same_job() {
    let (app, config) = app_with(Arc::new(MemoryStore::new()));
    let auth = bearer(&config, Uuid::new_v4());

    send(
        &app,
        request(
            Method::PUT,
            "/api/weights",
            Some(&auth),
            Some(json!({ "exercise_name": "Russian Twists", "weight": 12.5 })),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        request(Method::POST, "/functions/v1/monthly-progress-save", Some(&auth), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recordsProcessed"], 1);
}

#[tokio::test]
async fn snapshot_write_failure_fails_the_whole_run() {
    let inner = MemoryStore::new();
    let user = Uuid::new_v4();
    inner.upsert_weight(user, "Legpress", 100.0).await.unwrap();
    inner.upsert_weight(user, "Wide Row", 50.0).await.unwrap();
    let (app, config) = app_with(Arc::new(ReadOnlyStore(inner.clone())));
    let auth = bearer(&config, user);

    let (status, body) = send(
        &app,
        request(Method::POST, "/functions/v1/monthly-snapshot", Some(&auth), None),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("write failed"));
    assert!(body.get("recordsProcessed").is_none());
    assert!(inner.progress_for_user(user, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn weight_write_during_outage_is_reported() {
    let (app, config) = app_with(Arc::new(UnavailableStore));
    let auth = bearer(&config, Uuid::new_v4());

    let (status, body) = send(
        &app,
        request(
            Method::PUT,
            "/api/weights",
            Some(&auth),
            Some(json!({ "exercise_name": "Legpress", "weight": 100 })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], 503);
}

#[tokio::test]
async fn failed_weight_write_keeps_previous_value() {
    let inner = MemoryStore::new();
    let user = Uuid::new_v4();
    inner.upsert_weight(user, "Legpress", 100.0).await.unwrap();
    let (app, config) = app_with(Arc::new(ReadOnlyStore(inner.clone())));
    let auth = bearer(&config, user);

    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            "/api/weights",
            Some(&auth),
            Some(json!({ "exercise_name": "Legpress", "weight": 120 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/weights/adjust",
            Some(&auth),
            Some(json!({ "exercise_name": "Chest Press", "delta": 2.5 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = send(
        &app,
        request(
            Method::GET,
            "/api/weights?exercises=Legpress,Chest%20Press",
            Some(&auth),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weights"]["Legpress"], 100.0);
    assert_eq!(body["weights"]["Chest Press"], 0.0);
    assert_eq!(inner.weights_for_user(user).await.unwrap().len(), 1);
}
