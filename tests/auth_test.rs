//! Authentication and authorization integration tests.
//!
//! Every request passes the same pipeline: credential extraction, token
//! verification, session lookup, account check, then the role allow-list
//! declared on the route group.

mod helpers;

use axum::http::{header, Method, StatusCode};
use serde_json::json;

use canteen::models::Role;
use helpers::{body_json, create_test_db, json_request, login, seed_user, test_app};

#[tokio::test]
async fn test_login_and_access_protected_route() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Alice", "alice@example.com", "password123", Role::Customer).await;

    let token = login(&app, "alice@example.com", "password123").await;

    let response = json_request(
        &app,
        Method::GET,
        "/api/users/profile",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["role"], "CUSTOMER");
    // Password hash must never leave the server
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_missing_credential_returns_401() {
    let pool = create_test_db().await;
    let app = test_app(pool);

    let response = json_request(&app, Method::GET, "/api/users/profile", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn test_garbage_token_returns_401() {
    let pool = create_test_db().await;
    let app = test_app(pool);

    let response = json_request(
        &app,
        Method::GET,
        "/api/users/profile",
        Some("not-a-real-token"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_revoked_token_fails_even_though_signature_is_valid() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Alice", "alice@example.com", "password123", Role::Customer).await;

    let token = login(&app, "alice@example.com", "password123").await;

    // Works while the session is live
    let response =
        json_request(&app, Method::GET, "/api/users/profile", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Logout revokes the session; the token itself is still unexpired
    let response =
        json_request(&app, Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response =
        json_request(&app, Method::GET, "/api/users/profile", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Alice", "alice@example.com", "password123", Role::Customer).await;

    let token = login(&app, "alice@example.com", "password123").await;

    for _ in 0..2 {
        let response =
            json_request(&app, Method::POST, "/api/auth/logout", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Even with no credential at all
    let response = json_request(&app, Method::POST, "/api/auth/logout", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_customer_cannot_reach_staff_routes() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Alice", "alice@example.com", "password123", Role::Customer).await;

    let token = login(&app, "alice@example.com", "password123").await;

    let response = json_request(
        &app,
        Method::POST,
        "/api/admin/categories",
        Some(&token),
        Some(json!({ "name": "Drinks" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["status"], 403);
}

#[tokio::test]
async fn test_staff_cannot_reach_admin_routes() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Bob", "bob@example.com", "password123", Role::Staff).await;

    let token = login(&app, "bob@example.com", "password123").await;

    let response =
        json_request(&app, Method::GET, "/api/admin/users", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // But staff routes work
    let response = json_request(
        &app,
        Method::POST,
        "/api/admin/categories",
        Some(&token),
        Some(json!({ "name": "Drinks" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_reaches_staff_and_admin_routes() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Root", "root@example.com", "password123", Role::Admin).await;

    let token = login(&app, "root@example.com", "password123").await;

    let response =
        json_request(&app, Method::GET, "/api/admin/users", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = json_request(
        &app,
        Method::POST,
        "/api/admin/categories",
        Some(&token),
        Some(json!({ "name": "Mains" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_staff_cannot_use_customer_cart() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Bob", "bob@example.com", "password123", Role::Staff).await;

    let token = login(&app, "bob@example.com", "password123").await;

    let response = json_request(&app, Method::GET, "/api/cart", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_routes_without_role_list_accept_any_role() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Alice", "alice@example.com", "password123", Role::Customer).await;
    seed_user(&pool, "Bob", "bob@example.com", "password123", Role::Staff).await;

    for email in ["alice@example.com", "bob@example.com"] {
        let token = login(&app, email, "password123").await;
        let response =
            json_request(&app, Method::GET, "/api/categories", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_disabled_account_cannot_login_or_use_live_token() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    let user =
        seed_user(&pool, "Alice", "alice@example.com", "password123", Role::Customer).await;

    let token = login(&app, "alice@example.com", "password123").await;

    canteen::queries::user::set_enabled(&pool, user.id, false)
        .await
        .unwrap();

    // Live token dies with the account
    let response =
        json_request(&app, Method::GET, "/api/users/profile", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // And a fresh login is rejected too
    let response = json_request(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_password_returns_401() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Alice", "alice@example.com", "password123", Role::Customer).await;

    let response = json_request(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let pool = create_test_db().await;
    let app = test_app(pool);

    let payload = json!({
        "name": "Alice",
        "email": "alice@example.com",
        "password": "password123"
    });

    let response = json_request(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(payload.clone()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response =
        json_request(&app, Method::POST, "/api/auth/register", None, Some(payload)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_cookie_credential_works_as_fallback() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Alice", "alice@example.com", "password123", Role::Customer).await;

    let token = login(&app, "alice@example.com", "password123").await;

    let request = axum::extract::Request::builder()
        .method(Method::GET)
        .uri("/api/users/profile")
        .header(header::COOKIE, format!("AUTH_TOKEN={token}"))
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.clone(), request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_password_change_revokes_sessions() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Alice", "alice@example.com", "password123", Role::Customer).await;

    let token = login(&app, "alice@example.com", "password123").await;

    let response = json_request(
        &app,
        Method::PUT,
        "/api/users/password",
        Some(&token),
        Some(json!({
            "current_password": "password123",
            "new_password": "password456"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Old token is dead, new credentials work
    let response =
        json_request(&app, Method::GET, "/api/users/profile", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    login(&app, "alice@example.com", "password456").await;
}
