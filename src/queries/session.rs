//! Session store: persisted (user, token) records backing logout/revocation.
//!
//! A syntactically valid, unexpired token whose row has been deleted here
//! must fail authentication.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::Session;

/// Persist a new active session; several rows per user are fine (multi-device)
pub async fn insert_session(pool: &SqlitePool, user_id: Uuid, token: &str) -> sqlx::Result<()> {
    sqlx::query("INSERT INTO auth_tokens (user_id, token, created_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(token)
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(())
}

/// Look up a live session by owner and token
pub async fn find_session(
    pool: &SqlitePool,
    user_id: Uuid,
    token: &str,
) -> sqlx::Result<Option<Session>> {
    sqlx::query_as::<_, Session>(
        "SELECT id, user_id, token, created_at FROM auth_tokens WHERE user_id = ? AND token = ?",
    )
    .bind(user_id)
    .bind(token)
    .fetch_optional(pool)
    .await
}

/// Single-session logout; deleting an absent token is a no-op
pub async fn delete_session_by_token(pool: &SqlitePool, token: &str) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM auth_tokens WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Bulk revocation: log the user out everywhere
pub async fn delete_sessions_by_user(pool: &SqlitePool, user_id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM auth_tokens WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
