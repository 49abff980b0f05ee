//! Order handlers: customer checkout and history, staff management.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use crate::auth::CurrentUser;
use crate::error::{AppError, AppResult};
use crate::models::{Order, OrderStatus, Role};
use crate::queries::order::{self, CheckoutInput, OrderSearch, OrderWithLines};

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    pub delivery_address: Option<String>,
    pub phone_number: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    pub customer_name: Option<String>,
}

/// POST /api/orders/checkout (CUSTOMER)
pub async fn checkout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<OrderWithLines>> {
    payload.validate()?;

    let order = order::checkout(
        &state.pool,
        &current.0,
        CheckoutInput {
            delivery_address: payload.delivery_address,
            phone_number: payload.phone_number,
            notes: payload.notes,
            customer_name: payload.customer_name,
        },
    )
    .await?;

    Ok(Json(order))
}

/// GET /api/orders/my-orders (CUSTOMER)
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Vec<OrderWithLines>>> {
    let orders = order::list_user_orders(&state.pool, current.0.id).await?;
    Ok(Json(orders))
}

/// POST /api/orders/{id}/cancel (CUSTOMER, own orders only)
///
/// Cancellation follows the status machine: only PENDING, CONFIRMED and
/// PREPARING orders can still be cancelled.
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    let existing = order::get_order(&state.pool, id).await?;
    if existing.order.user_id != current.0.id {
        return Err(AppError::Forbidden(
            "You can only cancel your own orders".to_string(),
        ));
    }

    let updated = order::update_status(&state.pool, id, OrderStatus::Cancelled).await?;
    Ok(Json(updated))
}

/// GET /api/orders/{id} - Customers may only see their own orders
pub async fn get_order(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderWithLines>> {
    let found = order::get_order(&state.pool, id).await?;

    if current.role() == Role::Customer && found.order.user_id != current.0.id {
        return Err(AppError::Forbidden(
            "You can only view your own orders".to_string(),
        ));
    }

    Ok(Json(found))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub order_number: Option<String>,
    pub customer_name: Option<String>,
    pub status: Option<OrderStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// GET /api/orders/admin/search (ADMIN, STAFF)
pub async fn search_orders(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = order::search_orders(
        &state.pool,
        OrderSearch {
            order_number: params.order_number,
            customer_name: params.customer_name,
            status: params.status,
            start_date: params.start_date,
            end_date: params.end_date,
        },
    )
    .await?;

    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// PUT /api/orders/{id}/status (ADMIN, STAFF)
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<Order>> {
    let updated = order::update_status(&state.pool, id, payload.status).await?;
    Ok(Json(updated))
}
