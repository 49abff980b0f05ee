//! Cart behavior integration tests.

mod helpers;

use axum::http::{Method, StatusCode};
use serde_json::json;

use canteen::models::Role;
use helpers::{body_json, create_test_db, json_request, login, seed_menu_item, seed_user, test_app};

#[tokio::test]
async fn test_empty_cart_is_created_lazily() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Alice", "alice@example.com", "password123", Role::Customer).await;
    let token = login(&app, "alice@example.com", "password123").await;

    let response = json_request(&app, Method::GET, "/api/cart", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["item_count"], 0);
    assert!(body["lines"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_adding_same_item_twice_increments_quantity() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Alice", "alice@example.com", "password123", Role::Customer).await;
    let item_id = seed_menu_item(&pool, "Nasi Goreng", 25000).await;
    let token = login(&app, "alice@example.com", "password123").await;

    for quantity in [2, 3] {
        let response = json_request(
            &app,
            Method::POST,
            "/api/cart/items",
            Some(&token),
            Some(json!({ "menu_item_id": item_id, "quantity": quantity })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = json_request(&app, Method::GET, "/api/cart", Some(&token), None).await;
    let body = body_json(response).await;

    // One line, merged quantity
    let lines = body["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 5);
    assert_eq!(lines[0]["subtotal"], 125000);
    assert_eq!(body["total"], 125000);
    assert_eq!(body["item_count"], 5);
}

#[tokio::test]
async fn test_unavailable_item_cannot_be_added() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Alice", "alice@example.com", "password123", Role::Customer).await;
    let item_id = seed_menu_item(&pool, "Soto Ayam", 18000).await;
    canteen::queries::menu::set_available(&pool, item_id, false)
        .await
        .unwrap();
    let token = login(&app, "alice@example.com", "password123").await;

    let response = json_request(
        &app,
        Method::POST,
        "/api/cart/items",
        Some(&token),
        Some(json!({ "menu_item_id": item_id, "quantity": 1 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_zero_quantity_update_removes_line() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Alice", "alice@example.com", "password123", Role::Customer).await;
    let item_id = seed_menu_item(&pool, "Nasi Goreng", 25000).await;
    let token = login(&app, "alice@example.com", "password123").await;

    json_request(
        &app,
        Method::POST,
        "/api/cart/items",
        Some(&token),
        Some(json!({ "menu_item_id": item_id, "quantity": 2 })),
    )
    .await;

    let response = json_request(
        &app,
        Method::PUT,
        &format!("/api/cart/items/{item_id}"),
        Some(&token),
        Some(json!({ "quantity": 0 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = json_request(&app, Method::GET, "/api/cart", Some(&token), None).await;
    let body = body_json(response).await;
    assert!(body["lines"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_updating_missing_line_is_not_found() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Alice", "alice@example.com", "password123", Role::Customer).await;
    let item_id = seed_menu_item(&pool, "Nasi Goreng", 25000).await;
    let token = login(&app, "alice@example.com", "password123").await;

    let response = json_request(
        &app,
        Method::PUT,
        &format!("/api/cart/items/{item_id}"),
        Some(&token),
        Some(json!({ "quantity": 3 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_carts_are_per_user() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Alice", "alice@example.com", "password123", Role::Customer).await;
    seed_user(&pool, "Carol", "carol@example.com", "password123", Role::Customer).await;
    let item_id = seed_menu_item(&pool, "Nasi Goreng", 25000).await;

    let alice = login(&app, "alice@example.com", "password123").await;
    let carol = login(&app, "carol@example.com", "password123").await;

    json_request(
        &app,
        Method::POST,
        "/api/cart/items",
        Some(&alice),
        Some(json!({ "menu_item_id": item_id, "quantity": 2 })),
    )
    .await;

    let response = json_request(&app, Method::GET, "/api/cart", Some(&carol), None).await;
    let body = body_json(response).await;
    assert!(body["lines"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_clear_cart() {
    let pool = create_test_db().await;
    let app = test_app(pool.clone());
    seed_user(&pool, "Alice", "alice@example.com", "password123", Role::Customer).await;
    let first = seed_menu_item(&pool, "Nasi Goreng", 25000).await;
    let second = seed_menu_item(&pool, "Es Teh", 5000).await;
    let token = login(&app, "alice@example.com", "password123").await;

    for (id, quantity) in [(first, 2), (second, 1)] {
        json_request(
            &app,
            Method::POST,
            "/api/cart/items",
            Some(&token),
            Some(json!({ "menu_item_id": id, "quantity": quantity })),
        )
        .await;
    }

    let response = json_request(&app, Method::DELETE, "/api/cart", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = json_request(&app, Method::GET, "/api/cart", Some(&token), None).await;
    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
}
