//! Smoke tests for the core web flows, run with the cloud unreachable —
//! the whole application must keep working from the local store alone.

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use nexushr::api::{self, AppState};
use nexushr::config::Config;

async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

async fn spawn_app() -> (Arc<AppState>, Router) {
    let db_path =
        std::env::temp_dir().join(format!("nexushr-smoke-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.cloud.api_url = unreachable_url().await;
    config.cloud.request_timeout_seconds = 2;
    config.server.secure_cookies = false;
    config.scheduler.enabled = false;
    // Cheap argon2 parameters keep the tests fast.
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let state = api::create_app_state_from_config(config, None)
        .await
        .expect("failed to create app state");

    let router = api::router(state.clone()).await;
    (state, router)
}

fn request(
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Option<String>, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({ "username": username, "password": password })),
        ))
        .await
        .unwrap();

    let status = response.status();
    let cookie = session_cookie(&response);
    let json = body_json(response).await;
    (status, cookie, json)
}

async fn admin_session(app: &Router) -> String {
    let (status, cookie, _) = login(app, "admin", "8278").await;
    assert_eq!(status, StatusCode::OK);
    cookie.expect("missing admin session cookie")
}

async fn hire_li_ru(app: &Router, admin: &str) -> String {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/employees",
            Some(admin),
            Some(serde_json::json!({
                "name": "Li Ru",
                "jobTitle": "Sales Manager",
                "gender": "Female",
                "joinDate": "2024-06-15",
                "probationSalary": 4000.0,
                "fullSalary": 6000.0,
                "probationMonths": 3
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    json["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn smoke_login_and_employee_lifecycle() {
    let (_, app) = spawn_app().await;

    // Invalid credentials are rejected.
    let (status, _, _) = login(&app, "admin", "wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The employee list is behind a session.
    let response = app
        .clone()
        .oneshot(request("GET", "/api/employees", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let admin = admin_session(&app).await;

    let response = app
        .clone()
        .oneshot(request("GET", "/api/employees", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);

    // Hiring derives the id from the name initials and join date.
    let id = hire_li_ru(&app, &admin).await;
    assert_eq!(id, "lr0615");

    // Probation salary must stay below the full salary.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/employees",
            Some(&admin),
            Some(serde_json::json!({
                "name": "Zhang San",
                "jobTitle": "Clerk",
                "gender": "Male",
                "joinDate": "2024-07-01",
                "probationSalary": 5000.0,
                "fullSalary": 5000.0
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // First login with the default password forces a change.
    let (status, cookie, json) = login(&app, "lr0615", "1234").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["mustChangePassword"], true);
    let employee_cookie = cookie.unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/password",
            Some(&employee_cookie),
            Some(serde_json::json!({ "newPassword": "abcd" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _, json) = login(&app, "lr0615", "abcd").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["mustChangePassword"], false);

    // Too-short replacement passwords are rejected.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth/password",
            Some(&employee_cookie),
            Some(serde_json::json!({ "newPassword": "abc" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Admin reset puts the default password back.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/employees/lr0615/reset-password",
            Some(&admin),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _, json) = login(&app, "lr0615", "1234").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["mustChangePassword"], true);
}

#[tokio::test]
async fn smoke_leave_request_flow() {
    let (_, app) = spawn_app().await;
    let admin = admin_session(&app).await;
    hire_li_ru(&app, &admin).await;

    let (_, cookie, _) = login(&app, "lr0615", "1234").await;
    let employee = cookie.unwrap();

    // Inverted ranges are rejected.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/leaves",
            Some(&employee),
            Some(serde_json::json!({
                "startDate": "2024-07-12",
                "endDate": "2024-07-10",
                "reason": "oops"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/leaves",
            Some(&employee),
            Some(serde_json::json!({
                "startDate": "2024-07-10",
                "endDate": "2024-07-12",
                "reason": "family visit"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let leave_id = json["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(json["data"]["status"], "PENDING");
    assert_eq!(json["data"]["days"], 3);

    // Only admins decide.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/leaves/{leave_id}/status"),
            Some(&employee),
            Some(serde_json::json!({ "status": "APPROVED" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/leaves/{leave_id}/status"),
            Some(&admin),
            Some(serde_json::json!({ "status": "APPROVED" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "APPROVED");

    // Approved requests can no longer be edited by the employee.
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/leaves/{leave_id}"),
            Some(&employee),
            Some(serde_json::json!({
                "startDate": "2024-07-11",
                "endDate": "2024-07-12",
                "reason": "shorter"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The employee sees their own requests.
    let response = app
        .clone()
        .oneshot(request("GET", "/api/leaves", Some(&employee), None))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn smoke_payroll_flow_is_idempotent() {
    let (_, app) = spawn_app().await;
    let admin = admin_session(&app).await;
    hire_li_ru(&app, &admin).await;

    // Work month 2024-09: probation (3 months from June) is over.
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/salaries/preview?employeeId=lr0615&workMonth=2024-09&salesAmount=10000&bonusRate=3",
            Some(&admin),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "OFFICIAL");
    assert_eq!(json["data"]["standardSalary"], 6000.0);
    assert_eq!(json["data"]["bonusAmount"], 300.0);

    let save_body = serde_json::json!({
        "employeeId": "lr0615",
        "workMonth": "2024-09",
        "salesAmount": 10000.0,
        "bonusRate": 3.0
    });

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/salaries",
            Some(&admin),
            Some(save_body.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await["data"].clone();

    // Payout lands one month after the work month.
    assert_eq!(first["id"], "lr0615_2024-10");
    assert_eq!(first["month"], "2024-10");
    assert_eq!(
        first["totalSalary"].as_f64().unwrap(),
        first["basicSalary"].as_f64().unwrap() + 300.0
    );

    // Saving identical inputs reproduces the record except for updatedAt.
    let response = app
        .clone()
        .oneshot(request("POST", "/api/salaries", Some(&admin), Some(save_body)))
        .await
        .unwrap();
    let second = body_json(response).await["data"].clone();

    for field in [
        "id",
        "employeeId",
        "month",
        "basicSalary",
        "standardSalary",
        "leaveDeduction",
        "salesAmount",
        "bonusRate",
        "bonusAmount",
        "attendanceBonus",
        "totalSalary",
    ] {
        assert_eq!(first[field], second[field], "field {field} changed");
    }

    // Negative inputs abort with no partial save.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/salaries",
            Some(&admin),
            Some(serde_json::json!({
                "employeeId": "lr0615",
                "workMonth": "2024-09",
                "salesAmount": -1.0
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The projected payout for the month matches the saved row.
    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/salaries/total?workMonth=2024-09",
            Some(&admin),
            None,
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"]["payoutMonth"], "2024-10");
    assert_eq!(json["data"]["total"], first["totalSalary"]);

    // Unknown employees error loudly instead of silently no-opping.
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/salaries",
            Some(&admin),
            Some(serde_json::json!({
                "employeeId": "ghost0101",
                "workMonth": "2024-09"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn smoke_cascade_delete_retains_salary_history() {
    let (_, app) = spawn_app().await;
    let admin = admin_session(&app).await;
    hire_li_ru(&app, &admin).await;

    let (_, cookie, _) = login(&app, "lr0615", "1234").await;
    let employee = cookie.unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/leaves",
            Some(&employee),
            Some(serde_json::json!({
                "startDate": "2024-07-10",
                "endDate": "2024-07-12",
                "reason": "family visit"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/salaries",
            Some(&admin),
            Some(serde_json::json!({
                "employeeId": "lr0615",
                "workMonth": "2024-09"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request("DELETE", "/api/employees/lr0615", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Employee and leave requests are gone...
    let response = app
        .clone()
        .oneshot(request("GET", "/api/employees", Some(&admin), None))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/leaves", Some(&admin), None))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);

    // ...but salary history is retained for reporting.
    let response = app
        .clone()
        .oneshot(request("GET", "/api/salaries", Some(&admin), None))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn smoke_sync_and_health_endpoints() {
    let (_, app) = spawn_app().await;
    let admin = admin_session(&app).await;
    hire_li_ru(&app, &admin).await;

    // Offline: the hire is queued, not lost.
    let response = app
        .clone()
        .oneshot(request("GET", "/api/sync/status", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["online"], false);
    assert!(json["data"]["pending"].as_u64().unwrap() >= 1);

    // A manual flush against a dead backend keeps everything pending.
    let response = app
        .clone()
        .oneshot(request("POST", "/api/sync/flush", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["failed"].as_u64().unwrap() >= 1);
    assert_eq!(json["data"]["flushed"], 0);

    let response = app
        .clone()
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/system/status", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["databaseOk"], true);
    assert_eq!(json["data"]["cloudOnline"], false);
}
