//! Menu category CRUD.

use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::models::Category;

pub async fn list_categories(pool: &SqlitePool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>("SELECT id, name, description FROM categories ORDER BY name")
        .fetch_all(pool)
        .await
}

pub async fn get_category(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Category>> {
    sqlx::query_as::<_, Category>("SELECT id, name, description FROM categories WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_category(
    pool: &SqlitePool,
    name: &str,
    description: Option<&str>,
) -> AppResult<Category> {
    let result = sqlx::query("INSERT INTO categories (name, description) VALUES (?, ?)")
        .bind(name)
        .bind(description)
        .execute(pool)
        .await;

    let id = match result {
        Ok(done) => done.last_insert_rowid(),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(AppError::Validation("Category name already exists".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Category {
        id,
        name: name.to_string(),
        description: description.map(str::to_string),
    })
}

pub async fn update_category(
    pool: &SqlitePool,
    id: i64,
    name: &str,
    description: Option<&str>,
) -> AppResult<()> {
    let result = sqlx::query("UPDATE categories SET name = ?, description = ? WHERE id = ?")
        .bind(name)
        .bind(description)
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Category".to_string()));
    }
    Ok(())
}

/// Delete a category; rejected while menu items still reference it
pub async fn delete_category(pool: &SqlitePool, id: i64) -> AppResult<()> {
    let (in_use,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM menu_items WHERE category_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if in_use > 0 {
        return Err(AppError::Validation(
            "Category still has menu items".to_string(),
        ));
    }

    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Category".to_string()));
    }
    Ok(())
}
