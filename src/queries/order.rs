//! Order creation and management.
//!
//! Checkout is the one place with real invariants: the cart lines become
//! order lines with the menu price snapshotted at that instant, the total is
//! the exact sum of the snapshots, and persisting the order and emptying the
//! cart happen in the same transaction or not at all.

use chrono::{NaiveDate, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Order, OrderLine, OrderStatus, User};

/// Caller-supplied checkout fields; absent values fall back to the user's
/// stored profile
#[derive(Debug, Default)]
pub struct CheckoutInput {
    pub delivery_address: Option<String>,
    pub phone_number: Option<String>,
    pub notes: Option<String>,
    pub customer_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderWithLines {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

#[derive(Debug, sqlx::FromRow)]
struct PricedCartLine {
    menu_item_id: i64,
    quantity: i64,
    price: i64,
}

/// Convert the user's cart into an immutable order
///
/// Runs as a single transaction: read cart lines with current prices, write
/// the order and its lines, empty the cart. If a concurrent checkout drained
/// the cart between read and delete, the delete count betrays it and the
/// whole transaction rolls back with `ConflictingCheckout`.
pub async fn checkout(
    pool: &SqlitePool,
    user: &User,
    input: CheckoutInput,
) -> AppResult<OrderWithLines> {
    let mut tx = pool.begin().await?;

    let cart: Option<(i64,)> = sqlx::query_as("SELECT id FROM carts WHERE user_id = ?")
        .bind(user.id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some((cart_id,)) = cart else {
        return Err(AppError::EmptyCart);
    };

    let lines: Vec<PricedCartLine> = sqlx::query_as(
        "SELECT cl.menu_item_id, cl.quantity, mi.price
         FROM cart_lines cl
         JOIN menu_items mi ON mi.id = cl.menu_item_id
         WHERE cl.cart_id = ?
         ORDER BY cl.id",
    )
    .bind(cart_id)
    .fetch_all(&mut *tx)
    .await?;

    if lines.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let delivery_address = input
        .delivery_address
        .or_else(|| user.address.clone())
        .ok_or_else(|| AppError::Validation("Delivery address is required".to_string()))?;
    let customer_phone = input.phone_number.or_else(|| user.phone.clone());
    let customer_name = input.customer_name.unwrap_or_else(|| user.name.clone());

    let order_id = Uuid::new_v4();
    let created_at = Utc::now();
    let total_amount: i64 = lines.iter().map(|l| l.quantity * l.price).sum();

    // The UNIQUE constraint on order_number is the real guarantee; the random
    // suffix only makes collisions rare enough that a few retries suffice.
    let mut order_number = generate_order_number();
    let mut attempts = 0;
    loop {
        let result = sqlx::query(
            "INSERT INTO orders
               (id, user_id, order_number, customer_name, customer_phone,
                delivery_address, notes, status, total_amount, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(user.id)
        .bind(&order_number)
        .bind(&customer_name)
        .bind(&customer_phone)
        .bind(&delivery_address)
        .bind(&input.notes)
        .bind(OrderStatus::Pending)
        .bind(total_amount)
        .bind(created_at)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => break,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() && attempts < 3 => {
                attempts += 1;
                order_number = generate_order_number();
            }
            Err(e) => return Err(e.into()),
        }
    }

    let mut order_lines = Vec::with_capacity(lines.len());
    for line in &lines {
        let done = sqlx::query(
            "INSERT INTO order_lines (order_id, menu_item_id, quantity, price_at_order)
             VALUES (?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(line.menu_item_id)
        .bind(line.quantity)
        .bind(line.price)
        .execute(&mut *tx)
        .await?;

        order_lines.push(OrderLine {
            id: done.last_insert_rowid(),
            order_id,
            menu_item_id: line.menu_item_id,
            quantity: line.quantity,
            price_at_order: line.price,
        });
    }

    // Empty the cart in the same transaction. A mismatch in deleted rows
    // means another checkout consumed the cart after our read; roll back.
    let deleted = sqlx::query("DELETE FROM cart_lines WHERE cart_id = ?")
        .bind(cart_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if deleted != lines.len() as u64 {
        return Err(AppError::ConflictingCheckout);
    }

    sqlx::query("UPDATE carts SET updated_at = ? WHERE id = ?")
        .bind(created_at)
        .bind(cart_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        user_id = %user.id,
        order_number = %order_number,
        total_amount,
        "Checkout completed"
    );

    Ok(OrderWithLines {
        order: Order {
            id: order_id,
            user_id: user.id,
            order_number,
            customer_name,
            customer_phone,
            delivery_address,
            notes: input.notes,
            status: OrderStatus::Pending,
            total_amount,
            created_at,
        },
        lines: order_lines,
    })
}

fn generate_order_number() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(char::from)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    format!("ORD-{}-{}", Utc::now().timestamp_millis(), suffix)
}

const ORDER_COLUMNS: &str = "id, user_id, order_number, customer_name, customer_phone, \
                             delivery_address, notes, status, total_amount, created_at";

pub async fn get_order(pool: &SqlitePool, order_id: Uuid) -> AppResult<OrderWithLines> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"
    ))
    .bind(order_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

    let lines = sqlx::query_as::<_, OrderLine>(
        "SELECT id, order_id, menu_item_id, quantity, price_at_order
         FROM order_lines WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(OrderWithLines { order, lines })
}

pub async fn list_user_orders(pool: &SqlitePool, user_id: Uuid) -> AppResult<Vec<OrderWithLines>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ? ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut result = Vec::with_capacity(orders.len());
    for order in orders {
        let lines = sqlx::query_as::<_, OrderLine>(
            "SELECT id, order_id, menu_item_id, quantity, price_at_order
             FROM order_lines WHERE order_id = ? ORDER BY id",
        )
        .bind(order.id)
        .fetch_all(pool)
        .await?;
        result.push(OrderWithLines { order, lines });
    }

    Ok(result)
}

/// Advance an order's status along the state machine
///
/// Finalized orders (COMPLETED/CANCELLED) reject every transition; other
/// illegal moves (backwards, skipping a stage, cancelling mid-delivery) are
/// validation failures.
pub async fn update_status(
    pool: &SqlitePool,
    order_id: Uuid,
    next: OrderStatus,
) -> AppResult<Order> {
    let mut tx = pool.begin().await?;

    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"
    ))
    .bind(order_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

    if order.status.is_final() {
        return Err(AppError::OrderFinalized);
    }
    if !order.status.can_transition_to(next) {
        return Err(AppError::Validation(format!(
            "Cannot change order status from {} to {}",
            order.status, next
        )));
    }

    sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
        .bind(next)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Order {
        status: next,
        ..order
    })
}

pub struct OrderSearch {
    pub order_number: Option<String>,
    pub customer_name: Option<String>,
    pub status: Option<OrderStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Multi-criteria search for the staff order list
pub async fn search_orders(pool: &SqlitePool, search: OrderSearch) -> AppResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders
         WHERE (?1 IS NULL OR order_number LIKE '%' || ?1 || '%')
           AND (?2 IS NULL OR customer_name LIKE '%' || ?2 || '%')
           AND (?3 IS NULL OR status = ?3)
           AND (?4 IS NULL OR date(created_at) >= ?4)
           AND (?5 IS NULL OR date(created_at) <= ?5)
         ORDER BY created_at DESC"
    ))
    .bind(search.order_number)
    .bind(search.customer_name)
    .bind(search.status)
    .bind(search.start_date.map(|d| d.to_string()))
    .bind(search.end_date.map(|d| d.to_string()))
    .fetch_all(pool)
    .await?;

    Ok(orders)
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DashboardStats {
    pub today_order_count: i64,
    pub total_orders: i64,
    pub completed_orders: i64,
    pub cancelled_orders: i64,
    /// Revenue from completed orders, in minor units
    pub total_revenue: i64,
}

pub async fn dashboard_stats(pool: &SqlitePool) -> AppResult<DashboardStats> {
    let stats = sqlx::query_as::<_, DashboardStats>(
        "SELECT
           COALESCE(SUM(CASE WHEN date(created_at) = date('now') THEN 1 ELSE 0 END), 0)
             AS today_order_count,
           COUNT(*) AS total_orders,
           COALESCE(SUM(CASE WHEN status = 'COMPLETED' THEN 1 ELSE 0 END), 0)
             AS completed_orders,
           COALESCE(SUM(CASE WHEN status = 'CANCELLED' THEN 1 ELSE 0 END), 0)
             AS cancelled_orders,
           COALESCE(SUM(CASE WHEN status = 'COMPLETED' THEN total_amount ELSE 0 END), 0)
             AS total_revenue
         FROM orders",
    )
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DailySales {
    pub date: String,
    pub count: i64,
    pub sales: i64,
}

/// Per-day order count and takings for the dashboard chart
pub async fn daily_sales(
    pool: &SqlitePool,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> AppResult<Vec<DailySales>> {
    let rows = sqlx::query_as::<_, DailySales>(
        "SELECT date(created_at) AS date, COUNT(*) AS count,
                COALESCE(SUM(total_amount), 0) AS sales
         FROM orders
         WHERE status != 'CANCELLED'
           AND (?1 IS NULL OR date(created_at) >= ?1)
           AND (?2 IS NULL OR date(created_at) <= ?2)
         GROUP BY date(created_at)
         ORDER BY date(created_at)",
    )
    .bind(start.map(|d| d.to_string()))
    .bind(end.map(|d| d.to_string()))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PopularLocation {
    pub address: String,
    pub count: i64,
}

/// Top delivery addresses by order count
pub async fn popular_locations(pool: &SqlitePool) -> AppResult<Vec<PopularLocation>> {
    let rows = sqlx::query_as::<_, PopularLocation>(
        "SELECT delivery_address AS address, COUNT(*) AS count
         FROM orders
         GROUP BY delivery_address
         ORDER BY count DESC
         LIMIT 5",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_shape() {
        let n = generate_order_number();
        assert!(n.starts_with("ORD-"));
        let parts: Vec<&str> = n.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 4);
    }

    #[test]
    fn test_order_numbers_differ() {
        // Same millisecond is likely here; the random suffix must still
        // keep the numbers distinct almost always.
        let a = generate_order_number();
        let b = generate_order_number();
        let c = generate_order_number();
        assert!(a != b || b != c);
    }
}
