//! Profile self-service and admin account management.

use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::CurrentUser;
use crate::error::{AppError, AppResult};
use crate::models::{Role, User};
use crate::queries::{session, user};

/// GET /api/users/profile
pub async fn get_profile(Extension(current): Extension<CurrentUser>) -> Json<User> {
    Json(current.0)
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

/// PUT /api/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;
    user::update_profile(
        &state.pool,
        current.0.id,
        &payload.name,
        payload.phone.as_deref(),
        payload.address.as_deref(),
    )
    .await?;
    Ok(Json(json!({ "message": "Profile updated" })))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

/// PUT /api/users/password
///
/// Verifies the current password, then revokes every live session; the
/// caller has to log in again with the new credentials.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    if !verify_password(&payload.current_password, &current.0.password_hash)? {
        return Err(AppError::Validation(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.new_password)?;
    user::update_password_hash(&state.pool, current.0.id, &password_hash).await?;

    let revoked = session::delete_sessions_by_user(&state.pool, current.0.id).await?;
    tracing::info!(user_id = %current.0.id, revoked, "Password changed, sessions revoked");

    Ok(Json(json!({
        "message": "Password changed. Please login again."
    })))
}

/// POST /api/users/profile/image - Multipart profile picture upload
pub async fn upload_profile_image(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let image_url = super::menu::save_image(&state, "profile", multipart).await?;
    user::set_profile_image(&state.pool, current.0.id, &image_url).await?;

    if let Some(old) = current.0.profile_image {
        super::menu::remove_stored_image(&state, &old).await;
    }

    Ok(Json(json!({ "message": "Profile image uploaded", "image_url": image_url })))
}

/// GET /api/admin/users (ADMIN)
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let users = user::list_users(&state.pool).await?;
    Ok(Json(users))
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// PUT /api/admin/users/{id}/role (ADMIN)
pub async fn set_role(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetRoleRequest>,
) -> AppResult<impl IntoResponse> {
    if id == current.0.id {
        return Err(AppError::Validation(
            "You cannot change your own role".to_string(),
        ));
    }

    user::set_role(&state.pool, id, payload.role).await?;
    tracing::info!(user_id = %id, role = %payload.role, "Role changed");
    Ok(Json(json!({ "message": "Role updated" })))
}

#[derive(Debug, Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

/// PUT /api/admin/users/{id}/enabled (ADMIN)
///
/// Disabling also revokes the account's sessions, so live tokens stop
/// working immediately.
pub async fn set_enabled(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetEnabledRequest>,
) -> AppResult<impl IntoResponse> {
    if id == current.0.id {
        return Err(AppError::Validation(
            "You cannot disable your own account".to_string(),
        ));
    }

    user::set_enabled(&state.pool, id, payload.enabled).await?;

    if !payload.enabled {
        let revoked = session::delete_sessions_by_user(&state.pool, id).await?;
        tracing::info!(user_id = %id, revoked, "Account disabled, sessions revoked");
    }

    Ok(Json(json!({ "message": "Account updated" })))
}
