//! Login, registration and logout handlers.

use axum::{extract::State, http::HeaderMap, response::IntoResponse, Extension, Json};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use super::AppState;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{
    build_auth_cookie, clear_auth_cookie, extract_token, jwt::generate_token, CurrentUser,
};
use crate::error::{AppError, AppResult};
use crate::models::Role;
use crate::queries::{session, user};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub name: String,
    pub role: Role,
}

/// POST /api/auth/login
///
/// Verifies credentials, issues a signed token, records the session so it
/// can be revoked later, and sets the browser cookie alongside the JSON
/// response.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let user = user::get_user_by_email(&state.pool, &payload.email)
        .await?
        .ok_or_else(|| AppError::AuthRequired("Invalid email or password".to_string()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        tracing::warn!(email = %payload.email, "Login failed: bad password");
        return Err(AppError::AuthRequired(
            "Invalid email or password".to_string(),
        ));
    }

    if !user.enabled {
        tracing::warn!(user_id = %user.id, "Login rejected: account disabled");
        return Err(AppError::AuthRequired("Account is disabled".to_string()));
    }

    let token = generate_token(&user, &state.config.jwt.secret, state.config.jwt.lifetime_seconds)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    session::insert_session(&state.pool, user.id, &token).await?;

    let jar = jar.add(build_auth_cookie(
        token.clone(),
        state.config.jwt.lifetime_seconds,
    ));

    tracing::info!(user_id = %user.id, "User logged in");

    Ok((
        jar,
        Json(LoginResponse {
            token,
            name: user.name,
            role: user.role,
        }),
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// POST /api/auth/register - New accounts always start as CUSTOMER
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let password_hash = hash_password(&payload.password)?;

    let created = user::insert_user(
        &state.pool,
        user::NewUser {
            name: payload.name,
            email: payload.email,
            password_hash,
            phone: payload.phone,
            address: payload.address,
            role: Role::Customer,
        },
    )
    .await?;

    tracing::info!(user_id = %created.id, "User registered");

    Ok(Json(json!({
        "message": "Registration successful. Please login."
    })))
}

/// POST /api/auth/logout
///
/// Revokes the presented token (idempotent) and clears the cookie. Public
/// on purpose: logging out with an already-dead session still succeeds.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    if let Some(token) = extract_token(&headers, &jar) {
        session::delete_session_by_token(&state.pool, &token).await?;
    }

    let jar = jar.remove(clear_auth_cookie());

    Ok((jar, Json(json!({ "message": "Logged out" }))))
}

/// POST /api/auth/logout-all - Revoke every session of the caller
pub async fn logout_all(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let revoked = session::delete_sessions_by_user(&state.pool, current.0.id).await?;

    tracing::info!(user_id = %current.0.id, revoked, "Logged out everywhere");

    let jar = jar.remove(clear_auth_cookie());

    Ok((jar, Json(json!({ "message": "Logged out everywhere" }))))
}
