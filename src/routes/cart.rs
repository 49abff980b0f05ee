//! Cart handlers; all CUSTOMER-only.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use super::AppState;
use crate::auth::CurrentUser;
use crate::error::AppResult;
use crate::queries::cart;

#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub menu_item_id: i64,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
    pub subtotal: i64,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub id: i64,
    pub updated_at: DateTime<Utc>,
    pub lines: Vec<CartLineView>,
    pub total: i64,
    pub item_count: i64,
}

/// GET /api/cart - The caller's cart with lines and totals
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<CartView>> {
    let cart = cart::get_or_create_cart(&state.pool, current.0.id).await?;
    let lines = cart::cart_lines(&state.pool, cart.id).await?;

    let total = lines.iter().map(|l| l.subtotal()).sum();
    let item_count = lines.iter().map(|l| l.quantity).sum();
    let lines = lines
        .into_iter()
        .map(|l| CartLineView {
            subtotal: l.subtotal(),
            menu_item_id: l.menu_item_id,
            name: l.name,
            price: l.price,
            quantity: l.quantity,
        })
        .collect();

    Ok(Json(CartView {
        id: cart.id,
        updated_at: cart.updated_at,
        lines,
        total,
        item_count,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    pub menu_item_id: i64,
    #[validate(range(min = 1))]
    pub quantity: i64,
}

/// POST /api/cart/items
pub async fn add_item(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;
    cart::add_item(&state.pool, current.0.id, payload.menu_item_id, payload.quantity).await?;
    Ok(Json(json!({ "message": "Item added to cart" })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: i64,
}

/// PUT /api/cart/items/{menu_item_id} - Quantity of zero or below removes the line
pub async fn update_item(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(menu_item_id): Path<i64>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<impl IntoResponse> {
    cart::update_item(&state.pool, current.0.id, menu_item_id, payload.quantity).await?;
    Ok(Json(json!({ "message": "Cart item updated" })))
}

/// DELETE /api/cart/items/{menu_item_id}
pub async fn remove_item(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(menu_item_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    cart::remove_item(&state.pool, current.0.id, menu_item_id).await?;
    Ok(Json(json!({ "message": "Item removed from cart" })))
}

/// DELETE /api/cart
pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<impl IntoResponse> {
    cart::clear_cart(&state.pool, current.0.id).await?;
    Ok(Json(json!({ "message": "Cart cleared" })))
}
