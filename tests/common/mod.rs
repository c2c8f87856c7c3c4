#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use claseando::{ServerConfig, create_app, db::Database};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const JWT_SECRET: &[u8] = b"test-jwt-secret-that-is-long-enough";

/// Create a test app backed by an in-memory database. Returns (app, db).
pub async fn create_test_app() -> (Router, Database) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        jwt_secret: JWT_SECRET.to_vec(),
        secure_cookies: false,
    };
    (create_app(&config), db)
}

/// Send a request with an optional JSON body and cookie header.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

/// Send a request with a raw (possibly malformed) JSON body.
pub async fn send_raw(app: &Router, method: &str, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }

    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// Read the response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Extract Set-Cookie headers from response
pub fn extract_set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// Check if cookies contain a token being cleared (Max-Age=0)
pub fn has_cleared_cookie(cookies: &[String], cookie_name: &str) -> bool {
    cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}=;", cookie_name)) && c.contains("Max-Age=0"))
}

/// Cookie header carrying only the access token.
pub fn access_cookie_only(access_token: &str) -> String {
    format!("access_token={}", access_token)
}

/// Cookie header carrying only the refresh token.
pub fn refresh_cookie_only(refresh_token: &str) -> String {
    format!("refresh_token={}", refresh_token)
}

pub fn register_body(username: &str, email: &str, role: &str) -> Value {
    json!({
        "username": username,
        "email": email,
        "password": "correct horse battery staple",
        "confirm_password": "correct horse battery staple",
        "role": role,
    })
}

/// A registered user with the tokens returned at registration.
pub struct Session {
    pub id: i64,
    pub access_token: String,
    pub refresh_token: String,
}

impl Session {
    pub fn cookie(&self) -> String {
        access_cookie_only(&self.access_token)
    }
}

/// Register a user through the API and return their session.
pub async fn register(app: &Router, username: &str, role: &str) -> Session {
    let email = format!("{}@example.com", username);
    let response = send(
        app,
        "POST",
        "/register",
        Some(register_body(username, &email, role)),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    Session {
        id: json["user"]["id"].as_i64().unwrap(),
        access_token: json["token"].as_str().unwrap().to_string(),
        refresh_token: json["refreshToken"].as_str().unwrap().to_string(),
    }
}

pub async fn register_teacher(app: &Router, username: &str) -> Session {
    register(app, username, "Teacher").await
}

pub async fn register_student(app: &Router, username: &str) -> Session {
    register(app, username, "Student").await
}

pub async fn count_users(db: &Database) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db.pool())
        .await
        .unwrap()
}

/// Flag a user as deleted the way an administrator would, directly in the table.
pub async fn soft_delete_user(db: &Database, id: i64) {
    let result = sqlx::query("UPDATE users SET deleted = 1 WHERE id = ?")
        .bind(id)
        .execute(db.pool())
        .await
        .unwrap();
    assert_eq!(result.rows_affected(), 1);
}
