//! API integration tests.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

mod common;
use common::{TEST_DRIVER_CODE, test_app};

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn school_signup_body(email: &str) -> Value {
    json!({
        "schoolName": "Northfield Elementary",
        "adminName": "Dana Whitfield",
        "email": email,
        "password": "hunter22"
    })
}

/// Sign a school up and return its token.
async fn school_token(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/school/signup",
        None,
        Some(school_signup_body(email)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_school_signup_and_login_round_trip() {
    let app = test_app().await;

    let (status, signup) = send(
        &app,
        Method::POST,
        "/api/school/signup",
        None,
        Some(school_signup_body("admin@northfield.edu")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(signup["token"].is_string());
    assert_eq!(signup["user"]["schoolName"], "Northfield Elementary");
    // Password material never leaves the server.
    assert!(signup["user"].get("passwordHash").is_none());

    let (status, login) = send(
        &app,
        Method::POST,
        "/api/school/login",
        None,
        Some(json!({"email": "admin@northfield.edu", "password": "hunter22"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["user"]["id"], signup["user"]["id"]);

    // The issued token opens protected routes.
    let token = login["token"].as_str().unwrap();
    let (status, students) = send(
        &app,
        Method::GET,
        "/api/school/students",
        Some(token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(students, json!([]));
}

#[tokio::test]
async fn test_duplicate_school_email_conflicts() {
    let app = test_app().await;
    school_token(&app, "admin@northfield.edu").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/school/signup",
        None,
        Some(school_signup_body("admin@northfield.edu")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_signup_missing_fields_rejected() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/school/signup",
        None,
        Some(json!({"email": "admin@northfield.edu"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_login_unknown_email_and_wrong_password() {
    let app = test_app().await;
    school_token(&app, "admin@northfield.edu").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/school/login",
        None,
        Some(json!({"email": "nobody@northfield.edu", "password": "hunter22"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/school/login",
        None,
        Some(json!({"email": "admin@northfield.edu", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_driver_signup_gated_by_code() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/driver/signup",
        None,
        Some(json!({
            "fullName": "Marco Reyes",
            "email": "marco@buses.example",
            "password": "wheels-up",
            "driverCode": "WRONG-CODE"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/driver/signup",
        None,
        Some(json!({
            "fullName": "Marco Reyes",
            "email": "marco@buses.example",
            "password": "wheels-up",
            "driverCode": TEST_DRIVER_CODE
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/driver/login",
        None,
        Some(json!({"email": "marco@buses.example", "password": "wheels-up"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_parent_signup_accepts_name_field() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/parent/signup",
        None,
        Some(json!({
            "name": "Ines Fontaine",
            "email": "ines@example.com",
            "password": "carpool1",
            "studentCode": "STU-4411"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["fullName"], "Ines Fontaine");
    assert_eq!(body["user"]["studentCode"], "STU-4411");
}

#[tokio::test]
async fn test_protected_routes_reject_bad_tokens() {
    let app = test_app().await;

    // No token at all.
    let (status, _) = send(&app, Method::GET, "/api/school/students", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A token that is not a JWT.
    let (status, _) = send(
        &app,
        Method::GET,
        "/api/school/students",
        Some("not.a.token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A valid token for the wrong role.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/parent/signup",
        None,
        Some(json!({
            "name": "Ines Fontaine",
            "email": "ines@example.com",
            "password": "carpool1"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let parent_token = body["token"].as_str().unwrap();

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/school/students",
        Some(parent_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_roster_flow_maintains_bus_headcount() {
    let app = test_app().await;
    let token = school_token(&app, "admin@northfield.edu").await;

    let (status, bus) = send(
        &app,
        Method::POST,
        "/api/school/buses",
        Some(&token),
        Some(json!({
            "busNumber": "7",
            "carNumber": "KA-01-4455",
            "route": "North loop",
            "capacity": 40
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(bus["studentCount"], 0);

    let student_body = json!({
        "name": "Ravi Kumar",
        "class": "5B",
        "roll": "17",
        "address": "12 Hill Road",
        "bus": "7",
        "studentCode": "STU-9001"
    });
    let (status, student) = send(
        &app,
        Method::POST,
        "/api/school/students",
        Some(&token),
        Some(student_body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let student_id = student["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/school/students",
        Some(&token),
        Some(student_body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, buses) = send(&app, Method::GET, "/api/school/buses", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(buses[0]["studentCount"], 2);

    // Update one student's class without touching the rest.
    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/school/students/{student_id}"),
        Some(&token),
        Some(json!({"class": "6A"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["class"], "6A");
    assert_eq!(updated["name"], "Ravi Kumar");

    // Deleting releases the seat.
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/school/students/{student_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, buses) = send(&app, Method::GET, "/api/school/buses", Some(&token), None).await;
    assert_eq!(buses[0]["studentCount"], 1);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/school/students/{student_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_assign_driver_to_bus() {
    let app = test_app().await;
    let token = school_token(&app, "admin@northfield.edu").await;

    let (_, driver) = send(
        &app,
        Method::POST,
        "/api/driver/signup",
        None,
        Some(json!({
            "fullName": "Marco Reyes",
            "email": "marco@buses.example",
            "password": "wheels-up",
            "driverCode": TEST_DRIVER_CODE
        })),
    )
    .await;
    let driver_id = driver["user"]["id"].as_str().unwrap();

    let (_, bus) = send(
        &app,
        Method::POST,
        "/api/school/buses",
        Some(&token),
        Some(json!({
            "busNumber": "7",
            "carNumber": "KA-01-4455",
            "route": "North loop",
            "capacity": 40
        })),
    )
    .await;
    let bus_id = bus["id"].as_str().unwrap();

    let (status, assigned) = send(
        &app,
        Method::POST,
        "/api/school/buses/assign-driver",
        Some(&token),
        Some(json!({"busId": bus_id, "driverId": driver_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assigned["driverId"], driver_id);

    let (_, buses) = send(&app, Method::GET, "/api/school/buses", Some(&token), None).await;
    assert_eq!(buses[0]["driverName"], "Marco Reyes");

    // Unknown driver is a 404, not a silent assignment.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/school/buses/assign-driver",
        Some(&token),
        Some(json!({"busId": bus_id, "driverId": "drv_missing"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_otp_endpoints() {
    let app = test_app().await;

    // No mailer configured: the code is stored but not delivered.
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/send-otp",
        None,
        Some(json!({"email": "ines@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/send-otp",
        None,
        Some(json!({"email": "not-an-email"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Codes are six random digits; zero is never issued.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/verify-otp",
        None,
        Some(json!({"email": "ines@example.com", "otp": "000000"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Invalid OTP"));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/verify-otp",
        None,
        Some(json!({"email": "nobody@example.com", "otp": "123456"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("No OTP found"));
}

#[tokio::test]
async fn test_contact_endpoint_validation_and_degradation() {
    let app = test_app().await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/contact",
        None,
        Some(json!({"name": "Ines", "email": "ines@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Valid submission, but no mailer is configured in tests.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/contact",
        None,
        Some(json!({
            "name": "Ines",
            "email": "ines@example.com",
            "message": "Where does route 7 stop?"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
}
