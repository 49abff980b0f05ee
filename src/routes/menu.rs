//! Menu item handlers, including image upload.

use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use crate::error::{AppError, AppResult};
use crate::models::MenuItem;
use crate::queries::menu::{self, NewMenuItem};

const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct MenuListParams {
    pub category_id: Option<i64>,
    #[serde(default)]
    pub include_unavailable: bool,
}

/// GET /api/menu - Available items only unless include_unavailable is set
pub async fn list_menu_items(
    State(state): State<AppState>,
    Query(params): Query<MenuListParams>,
) -> AppResult<Json<Vec<MenuItem>>> {
    let items = menu::list_menu_items(
        &state.pool,
        params.category_id,
        !params.include_unavailable,
    )
    .await?;
    Ok(Json(items))
}

/// GET /api/menu/{id}
pub async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuItem>> {
    let found = menu::get_menu_item(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Menu item".to_string()))?;
    Ok(Json(found))
}

#[derive(Debug, Deserialize, Validate)]
pub struct MenuItemRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: String,
    #[validate(range(min = 0))]
    pub price: i64,
    pub category_id: Option<i64>,
}

/// POST /api/admin/menu (ADMIN, STAFF)
pub async fn create_menu_item(
    State(state): State<AppState>,
    Json(payload): Json<MenuItemRequest>,
) -> AppResult<Json<MenuItem>> {
    payload.validate()?;
    let created = menu::insert_menu_item(
        &state.pool,
        NewMenuItem {
            name: payload.name,
            description: payload.description,
            price: payload.price,
            category_id: payload.category_id,
        },
    )
    .await?;
    Ok(Json(created))
}

/// PUT /api/admin/menu/{id} (ADMIN, STAFF)
pub async fn update_menu_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;
    menu::update_menu_item(
        &state.pool,
        id,
        NewMenuItem {
            name: payload.name,
            description: payload.description,
            price: payload.price,
            category_id: payload.category_id,
        },
    )
    .await?;
    Ok(Json(json!({ "message": "Menu item updated" })))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub available: bool,
}

/// PUT /api/admin/menu/{id}/availability (ADMIN, STAFF)
pub async fn set_availability(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AvailabilityRequest>,
) -> AppResult<impl IntoResponse> {
    menu::set_available(&state.pool, id, payload.available).await?;
    Ok(Json(json!({ "message": "Availability updated" })))
}

/// DELETE /api/admin/menu/{id} (ADMIN, STAFF)
pub async fn delete_menu_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    menu::delete_menu_item(&state.pool, id).await?;
    Ok(Json(json!({ "message": "Menu item deleted" })))
}

/// POST /api/admin/menu/{id}/image (ADMIN, STAFF)
///
/// Multipart upload; replaces the stored image and removes the previous
/// file best-effort.
pub async fn upload_menu_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let existing = menu::get_menu_item(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Menu item".to_string()))?;

    let image_url = save_image(&state, "menu", multipart).await?;
    menu::set_image_url(&state.pool, id, &image_url).await?;

    if let Some(old) = existing.image_url {
        remove_stored_image(&state, &old).await;
    }

    Ok(Json(json!({ "message": "Image uploaded", "image_url": image_url })))
}

/// Read the `file` field from a multipart body and persist it under the
/// upload directory with a generated name. Returns the public URL path.
pub(super) async fn save_image(
    state: &AppState,
    prefix: &str,
    mut multipart: Multipart,
) -> AppResult<String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let extension = field
            .file_name()
            .and_then(|name| name.rsplit('.').next())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| AppError::Validation("File name is missing".to_string()))?;

        if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AppError::Validation(format!(
                "Unsupported image type '{extension}'; allowed: jpg, jpeg, png, webp"
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        if data.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        if data.len() > MAX_IMAGE_BYTES {
            return Err(AppError::Validation(
                "Uploaded file exceeds the 5 MB limit".to_string(),
            ));
        }

        let file_name = format!("{prefix}-{}.{extension}", Uuid::new_v4());
        let dir = std::path::Path::new(&state.config.upload.dir);

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create upload dir: {e}")))?;
        tokio::fs::write(dir.join(&file_name), &data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store upload: {e}")))?;

        return Ok(format!("/uploads/{file_name}"));
    }

    Err(AppError::Validation(
        "Multipart field 'file' is required".to_string(),
    ))
}

/// Delete a previously stored upload. Failures are logged, not surfaced;
/// the new image is already in place.
pub(super) async fn remove_stored_image(state: &AppState, image_url: &str) {
    let Some(file_name) = image_url.strip_prefix("/uploads/") else {
        return;
    };
    // Guard against traversal in stored paths
    if file_name.contains('/') || file_name.contains("..") {
        return;
    }

    let path = std::path::Path::new(&state.config.upload.dir).join(file_name);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!(image_url, "Failed to remove old upload: {}", e);
    }
}
