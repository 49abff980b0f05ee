//! Cart aggregate: one mutable pending-order state per user.
//!
//! A cart is created lazily on first access and never deleted, only
//! emptied. A menu item appears at most once per cart; adding it again
//! increments the quantity.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Cart, CartLineDetail};

/// Fetch the user's cart, creating it on first access
pub async fn get_or_create_cart(pool: &SqlitePool, user_id: Uuid) -> sqlx::Result<Cart> {
    if let Some(cart) =
        sqlx::query_as::<_, Cart>("SELECT id, user_id, updated_at FROM carts WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?
    {
        return Ok(cart);
    }

    let updated_at = Utc::now();
    // A concurrent first access may have inserted the row already; the
    // UNIQUE(user_id) constraint makes the second insert lose, so re-read.
    let result = sqlx::query("INSERT INTO carts (user_id, updated_at) VALUES (?, ?)")
        .bind(user_id)
        .bind(updated_at)
        .execute(pool)
        .await;

    match result {
        Ok(done) => Ok(Cart {
            id: done.last_insert_rowid(),
            user_id,
            updated_at,
        }),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            sqlx::query_as::<_, Cart>("SELECT id, user_id, updated_at FROM carts WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(pool)
                .await
        }
        Err(e) => Err(e),
    }
}

/// Cart lines joined with their menu items, for display and totals
pub async fn cart_lines(pool: &SqlitePool, cart_id: i64) -> sqlx::Result<Vec<CartLineDetail>> {
    sqlx::query_as::<_, CartLineDetail>(
        "SELECT cl.menu_item_id, mi.name, mi.price, cl.quantity
         FROM cart_lines cl
         JOIN menu_items mi ON mi.id = cl.menu_item_id
         WHERE cl.cart_id = ?
         ORDER BY cl.id",
    )
    .bind(cart_id)
    .fetch_all(pool)
    .await
}

/// Add a menu item to the cart; an existing line gets its quantity bumped
pub async fn add_item(
    pool: &SqlitePool,
    user_id: Uuid,
    menu_item_id: i64,
    quantity: i64,
) -> AppResult<()> {
    if quantity < 1 {
        return Err(AppError::Validation("Quantity must be at least 1".to_string()));
    }

    let item = sqlx::query_as::<_, (bool,)>("SELECT available FROM menu_items WHERE id = ?")
        .bind(menu_item_id)
        .fetch_optional(pool)
        .await?;
    match item {
        None => return Err(AppError::NotFound("Menu item".to_string())),
        Some((false,)) => {
            return Err(AppError::Validation(
                "Menu item is currently unavailable".to_string(),
            ))
        }
        Some((true,)) => {}
    }

    let cart = get_or_create_cart(pool, user_id).await?;

    sqlx::query(
        "INSERT INTO cart_lines (cart_id, menu_item_id, quantity) VALUES (?, ?, ?)
         ON CONFLICT (cart_id, menu_item_id)
         DO UPDATE SET quantity = quantity + excluded.quantity",
    )
    .bind(cart.id)
    .bind(menu_item_id)
    .bind(quantity)
    .execute(pool)
    .await?;

    touch_cart(pool, cart.id).await?;
    Ok(())
}

/// Set a line's quantity; zero or below removes the line
pub async fn update_item(
    pool: &SqlitePool,
    user_id: Uuid,
    menu_item_id: i64,
    quantity: i64,
) -> AppResult<()> {
    if quantity <= 0 {
        return remove_item(pool, user_id, menu_item_id).await;
    }

    let cart = get_or_create_cart(pool, user_id).await?;

    let result = sqlx::query(
        "UPDATE cart_lines SET quantity = ? WHERE cart_id = ? AND menu_item_id = ?",
    )
    .bind(quantity)
    .bind(cart.id)
    .bind(menu_item_id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Cart item".to_string()));
    }

    touch_cart(pool, cart.id).await?;
    Ok(())
}

/// Remove one menu item from the cart; absent lines are a no-op
pub async fn remove_item(pool: &SqlitePool, user_id: Uuid, menu_item_id: i64) -> AppResult<()> {
    let cart = get_or_create_cart(pool, user_id).await?;

    sqlx::query("DELETE FROM cart_lines WHERE cart_id = ? AND menu_item_id = ?")
        .bind(cart.id)
        .bind(menu_item_id)
        .execute(pool)
        .await?;

    touch_cart(pool, cart.id).await?;
    Ok(())
}

/// Empty the cart without deleting it
pub async fn clear_cart(pool: &SqlitePool, user_id: Uuid) -> AppResult<()> {
    let cart = get_or_create_cart(pool, user_id).await?;

    sqlx::query("DELETE FROM cart_lines WHERE cart_id = ?")
        .bind(cart.id)
        .execute(pool)
        .await?;

    touch_cart(pool, cart.id).await?;
    Ok(())
}

async fn touch_cart(pool: &SqlitePool, cart_id: i64) -> sqlx::Result<()> {
    sqlx::query("UPDATE carts SET updated_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(cart_id)
        .execute(pool)
        .await?;
    Ok(())
}
