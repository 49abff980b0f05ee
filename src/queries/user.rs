//! User lookups and account management.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Role, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, phone, address, role, enabled, profile_image, created_at";

pub async fn get_user(pool: &SqlitePool, user_id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
}

/// Insert a new account; duplicate email is a validation failure
pub async fn insert_user(pool: &SqlitePool, new_user: NewUser) -> AppResult<User> {
    let id = Uuid::new_v4();
    let created_at = Utc::now();

    let result = sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, phone, address, role, enabled, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(id)
    .bind(&new_user.name)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(&new_user.phone)
    .bind(&new_user.address)
    .bind(new_user.role)
    .bind(created_at)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {}
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(AppError::Validation("Email is already registered".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    Ok(User {
        id,
        name: new_user.name,
        email: new_user.email,
        password_hash: new_user.password_hash,
        phone: new_user.phone,
        address: new_user.address,
        role: new_user.role,
        enabled: true,
        profile_image: None,
        created_at,
    })
}

pub async fn update_profile(
    pool: &SqlitePool,
    user_id: Uuid,
    name: &str,
    phone: Option<&str>,
    address: Option<&str>,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET name = ?, phone = ?, address = ? WHERE id = ?")
        .bind(name)
        .bind(phone)
        .bind(address)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_password_hash(
    pool: &SqlitePool,
    user_id: Uuid,
    password_hash: &str,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_users(pool: &SqlitePool) -> sqlx::Result<Vec<User>> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub async fn set_role(pool: &SqlitePool, user_id: Uuid, role: Role) -> AppResult<()> {
    let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
        .bind(role)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User".to_string()));
    }
    Ok(())
}

/// Accounts are disabled instead of deleted
pub async fn set_enabled(pool: &SqlitePool, user_id: Uuid, enabled: bool) -> AppResult<()> {
    let result = sqlx::query("UPDATE users SET enabled = ? WHERE id = ?")
        .bind(enabled)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User".to_string()));
    }
    Ok(())
}

pub async fn set_profile_image(
    pool: &SqlitePool,
    user_id: Uuid,
    image_url: &str,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET profile_image = ? WHERE id = ?")
        .bind(image_url)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
