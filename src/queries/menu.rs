//! Menu item catalog.
//!
//! Price changes here never touch existing orders; checkout snapshots the
//! price into each order line.

use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::models::MenuItem;

const MENU_COLUMNS: &str = "id, name, description, price, category_id, image_url, available";

pub async fn list_menu_items(
    pool: &SqlitePool,
    category_id: Option<i64>,
    available_only: bool,
) -> sqlx::Result<Vec<MenuItem>> {
    sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {MENU_COLUMNS} FROM menu_items
         WHERE (?1 IS NULL OR category_id = ?1)
           AND (?2 = 0 OR available = 1)
         ORDER BY name"
    ))
    .bind(category_id)
    .bind(available_only)
    .fetch_all(pool)
    .await
}

pub async fn get_menu_item(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<MenuItem>> {
    sqlx::query_as::<_, MenuItem>(&format!("SELECT {MENU_COLUMNS} FROM menu_items WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub struct NewMenuItem {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub category_id: Option<i64>,
}

pub async fn insert_menu_item(pool: &SqlitePool, item: NewMenuItem) -> AppResult<MenuItem> {
    if item.price < 0 {
        return Err(AppError::Validation("Price must not be negative".to_string()));
    }

    let done = sqlx::query(
        "INSERT INTO menu_items (name, description, price, category_id, available)
         VALUES (?, ?, ?, ?, 1)",
    )
    .bind(&item.name)
    .bind(&item.description)
    .bind(item.price)
    .bind(item.category_id)
    .execute(pool)
    .await?;

    Ok(MenuItem {
        id: done.last_insert_rowid(),
        name: item.name,
        description: item.description,
        price: item.price,
        category_id: item.category_id,
        image_url: None,
        available: true,
    })
}

pub async fn update_menu_item(pool: &SqlitePool, id: i64, item: NewMenuItem) -> AppResult<()> {
    if item.price < 0 {
        return Err(AppError::Validation("Price must not be negative".to_string()));
    }

    let result = sqlx::query(
        "UPDATE menu_items SET name = ?, description = ?, price = ?, category_id = ? WHERE id = ?",
    )
    .bind(&item.name)
    .bind(&item.description)
    .bind(item.price)
    .bind(item.category_id)
    .bind(id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Menu item".to_string()));
    }
    Ok(())
}

/// Items with order history are toggled unavailable rather than deleted
pub async fn set_available(pool: &SqlitePool, id: i64, available: bool) -> AppResult<()> {
    let result = sqlx::query("UPDATE menu_items SET available = ? WHERE id = ?")
        .bind(available)
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Menu item".to_string()));
    }
    Ok(())
}

pub async fn set_image_url(pool: &SqlitePool, id: i64, image_url: &str) -> AppResult<()> {
    let result = sqlx::query("UPDATE menu_items SET image_url = ? WHERE id = ?")
        .bind(image_url)
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Menu item".to_string()));
    }
    Ok(())
}

/// Delete an item with no order history; otherwise callers should toggle
/// availability instead
pub async fn delete_menu_item(pool: &SqlitePool, id: i64) -> AppResult<()> {
    let (referenced,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM order_lines WHERE menu_item_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if referenced > 0 {
        return Err(AppError::Validation(
            "Menu item has order history; mark it unavailable instead".to_string(),
        ));
    }

    sqlx::query("DELETE FROM cart_lines WHERE menu_item_id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    let result = sqlx::query("DELETE FROM menu_items WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Menu item".to_string()));
    }
    Ok(())
}
