//! Shared helpers for integration tests: in-memory database, app router,
//! seeded accounts and login.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::Request,
    http::{header, Method, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tower::ServiceExt;

use canteen::auth::password::hash_password;
use canteen::models::{Role, User};
use canteen::queries::user::{insert_user, NewUser};
use canteen::routes::{router, AppState};

pub const TEST_JWT_SECRET: &str = "test_secret_key_minimum_32_characters_long";

/// In-memory test database with migrations applied
///
/// A single connection that never expires; every connection to
/// `sqlite::memory:` is its own database, so the pool must not open more.
pub async fn create_test_db() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to create test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

pub fn test_config() -> canteen::Config {
    canteen::Config {
        server: canteen::config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3001,
        },
        database: canteen::config::DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        jwt: canteen::config::JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            lifetime_seconds: 3600,
        },
        upload: canteen::config::UploadConfig {
            dir: std::env::temp_dir()
                .join("canteen-test-uploads")
                .to_string_lossy()
                .to_string(),
        },
        observability: canteen::config::ObservabilityConfig::default(),
    }
}

/// Full application router backed by the given pool
pub fn test_app(pool: SqlitePool) -> Router {
    router(AppState {
        pool,
        config: test_config(),
    })
}

/// Insert an enabled account with the given role
pub async fn seed_user(pool: &SqlitePool, name: &str, email: &str, password: &str, role: Role) -> User {
    let password_hash = hash_password(password).expect("Failed to hash password");
    insert_user(
        pool,
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            phone: Some("555-0100".to_string()),
            address: Some("1 Test Street".to_string()),
            role,
        },
    )
    .await
    .expect("Failed to seed user")
}

/// Log in through the API and return the bearer token
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = json_request(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK, "Login should succeed");

    let body = body_json(response).await;
    body["token"]
        .as_str()
        .expect("Login response should carry a token")
        .to_string()
}

/// Send a JSON request, optionally authenticated with a bearer token
pub async fn json_request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .expect("Request should not fail at the transport level")
}

/// Collect a response body into JSON
pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Body should be valid JSON")
}

/// Insert a category and a menu item priced in minor units; returns the
/// menu item id
pub async fn seed_menu_item(pool: &SqlitePool, name: &str, price: i64) -> i64 {
    let category = canteen::queries::category::insert_category(pool, &format!("cat-{name}"), None)
        .await
        .expect("Failed to seed category");

    let item = canteen::queries::menu::insert_menu_item(
        pool,
        canteen::queries::menu::NewMenuItem {
            name: name.to_string(),
            description: format!("{name} description"),
            price,
            category_id: Some(category.id),
        },
    )
    .await
    .expect("Failed to seed menu item");

    item.id
}
