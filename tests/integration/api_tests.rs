//! API integration tests
//!
//! Drive the full router in-process over the in-memory stores.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use attendance_server::{
    api,
    config::AppConfig,
    models::{
        office::Office,
        user::{Role, UserClaims},
    },
    repository::memory::{MemoryOfficeRegistry, MemorySessionStore},
    services::{Services, SystemClock},
    AppState,
};

const OFFICE_LAT: f64 = -6.2088;
const OFFICE_LNG: f64 = 106.8456;

fn office(id: i64, name: &str, radius_meters: i32, is_active: bool) -> Office {
    Office {
        id,
        name: name.to_string(),
        address: "Jl. Sudirman No. 1".to_string(),
        latitude: OFFICE_LAT,
        longitude: OFFICE_LNG,
        radius_meters,
        is_active,
        created_at: None,
        updated_at: None,
    }
}

struct TestApp {
    router: Router,
    secret: String,
    ttl_hours: u64,
}

impl TestApp {
    fn new() -> Self {
        let config = AppConfig::default();
        let registry = Arc::new(MemoryOfficeRegistry::with_offices(vec![
            office(1, "Head Office", 100, true),
            office(2, "Warehouse", 50, true),
            office(3, "Old Branch", 100, false),
        ]));
        let services = Services::from_stores(
            registry,
            Arc::new(MemorySessionStore::new()),
            Arc::new(SystemClock),
            config.attendance.clone(),
        );

        let secret = config.auth.jwt_secret.clone();
        let ttl_hours = config.auth.jwt_expiration_hours;
        let state = AppState {
            config: Arc::new(config),
            services: Arc::new(services),
        };

        Self {
            router: api::create_router(state),
            secret,
            ttl_hours,
        }
    }

    fn token(&self, user_id: i64, role: Role) -> String {
        UserClaims::new(user_id, "tester", role, self.ttl_hours)
            .create_token(&self.secret)
            .unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.send(Method::GET, "/api/v1/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_requires_bearer_token() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/v1/attendance", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2);

    let (status, _) = app
        .send(Method::GET, "/api/v1/attendance", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_offices_only_active() {
    let app = TestApp::new();
    let token = app.token(10, Role::Employee);

    let (status, body) = app
        .send(Method::GET, "/api/v1/offices", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Head Office", "Warehouse"]);

    let (status, _) = app
        .send(Method::GET, "/api/v1/offices/99", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_check_in_and_check_out_flow() {
    let app = TestApp::new();
    let token = app.token(10, Role::Employee);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/attendance",
            Some(&token),
            Some(json!({
                "office_id": 1,
                "latitude": OFFICE_LAT,
                "longitude": OFFICE_LNG,
                "notes": "Test check-in"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Successfully checked in at Head Office!");
    assert_eq!(body["session"]["status"], "active");
    assert_eq!(body["session"]["employee_id"], 10);
    assert!(body["session"]["check_out"].is_null());

    // Status shows the open session
    let (status, body) = app
        .send(Method::GET, "/api/v1/attendance", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active_session"]["office"]["name"], "Head Office");
    assert_eq!(body["offices"].as_array().unwrap().len(), 2);

    // Second check-in the same day
    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/attendance",
            Some(&token),
            Some(json!({ "office_id": 2, "latitude": OFFICE_LAT, "longitude": OFFICE_LNG })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 10);

    // Check-out far away is rejected with the numbers for the message
    let (status, body) = app
        .send(
            Method::PUT,
            "/api/v1/attendance",
            Some(&token),
            Some(json!({ "latitude": OFFICE_LAT + 0.01, "longitude": OFFICE_LNG })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 12);
    assert_eq!(body["radius_meters"], 100);
    assert!(body["distance_meters"].as_i64().unwrap() > 1000);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .ends_with("Please move closer (within 100m) to check out."));

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/v1/attendance",
            Some(&token),
            Some(json!({ "latitude": OFFICE_LAT, "longitude": OFFICE_LNG, "notes": "Done" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["status"], "completed");
    assert_eq!(body["session"]["notes"], "Test check-in\nDone");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Successfully checked out! Work duration: 0h"));

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/v1/attendance",
            Some(&token),
            Some(json!({ "latitude": OFFICE_LAT, "longitude": OFFICE_LNG })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 11);

    let (status, body) = app
        .send(Method::GET, "/api/v1/attendance/history", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessions"]["total"], 1);
    assert_eq!(body["statistics"]["total_days"], 1);
}

#[tokio::test]
async fn test_check_in_rejections() {
    let app = TestApp::new();
    let token = app.token(11, Role::Employee);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/attendance",
            Some(&token),
            Some(json!({ "office_id": 1, "latitude": 95.0, "longitude": OFFICE_LNG })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/attendance",
            Some(&token),
            Some(json!({ "office_id": 3, "latitude": OFFICE_LAT, "longitude": OFFICE_LNG })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 13);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/attendance",
            Some(&token),
            Some(json!({ "office_id": 2, "latitude": OFFICE_LAT + 0.001, "longitude": OFFICE_LNG })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 12);
    assert_eq!(body["radius_meters"], 50);
    assert_eq!(body["distance_meters"], 111);
    assert_eq!(
        body["message"],
        "You are 111m away from the office. Please move closer (within 50m) to check in."
    );

    // Nothing was opened by the rejected attempts
    let (_, body) = app
        .send(Method::GET, "/api/v1/attendance", Some(&token), None)
        .await;
    assert!(body["active_session"].is_null());
}

#[tokio::test]
async fn test_reports_require_manager_role() {
    let app = TestApp::new();
    let employee = app.token(12, Role::Employee);
    let admin = app.token(1, Role::Admin);
    let hrd = app.token(2, Role::Hrd);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/attendance",
            Some(&employee),
            Some(json!({ "office_id": 1, "latitude": OFFICE_LAT, "longitude": OFFICE_LNG })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .send(Method::GET, "/api/v1/reports", Some(&employee), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Managers do not record attendance themselves
    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/attendance",
            Some(&admin),
            Some(json!({ "office_id": 1, "latitude": OFFICE_LAT, "longitude": OFFICE_LNG })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(Method::GET, "/api/v1/reports", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["statistics"]["total_sessions"], 1);
    assert_eq!(body["statistics"]["incomplete_count"], 1);
    assert_eq!(body["sessions"]["page"], 1);
    assert_eq!(body["sessions"]["per_page"], 20);

    let (status, body) = app
        .send(Method::GET, "/api/v1/reports/overview", Some(&hrd), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["today_sessions"], 1);
    assert_eq!(body["open_sessions"], 1);
    assert_eq!(body["active_offices"], 2);

    let (status, body) = app
        .send(Method::GET, "/api/v1/reports/daily", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["groups"][0]["office"]["name"], "Head Office");

    let (status, body) = app
        .send(Method::GET, "/api/v1/reports/monthly", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["employees"][0]["employee_id"], 12);

    let (status, body) = app
        .send(Method::GET, "/api/v1/reports/employees/99", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessions"]["total"], 0);
    assert_eq!(body["statistics"]["average_hours"], 0.0);

    let (status, _) = app
        .send(
            Method::GET,
            "/api/v1/reports?start_date=2024-03-10&end_date=2024-03-01",
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_far_page_numbers_return_empty_pages() {
    let app = TestApp::new();
    let employee = app.token(13, Role::Employee);
    let admin = app.token(1, Role::Admin);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/attendance",
            Some(&employee),
            Some(json!({ "office_id": 1, "latitude": OFFICE_LAT, "longitude": OFFICE_LNG })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/v1/reports?page={}", i64::MAX),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessions"]["total"], 1);
    assert_eq!(body["sessions"]["page"], i64::MAX);
    assert!(body["sessions"]["items"].as_array().unwrap().is_empty());

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/v1/attendance/history?page={}", i64::MAX),
            Some(&employee),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessions"]["total"], 1);
    assert!(body["sessions"]["items"].as_array().unwrap().is_empty());
}
