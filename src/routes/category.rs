//! Category handlers. Reads are open to any authenticated user, writes
//! live under /api/admin and require ADMIN or STAFF.

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use super::AppState;
use crate::error::{AppError, AppResult};
use crate::models::Category;
use crate::queries::category;

/// GET /api/categories
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let categories = category::list_categories(&state.pool).await?;
    Ok(Json(categories))
}

/// GET /api/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Category>> {
    let found = category::get_category(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))?;
    Ok(Json(found))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// POST /api/admin/categories (ADMIN, STAFF)
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CategoryRequest>,
) -> AppResult<Json<Category>> {
    payload.validate()?;
    let created =
        category::insert_category(&state.pool, &payload.name, payload.description.as_deref())
            .await?;
    Ok(Json(created))
}

/// PUT /api/admin/categories/{id} (ADMIN, STAFF)
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;
    category::update_category(&state.pool, id, &payload.name, payload.description.as_deref())
        .await?;
    Ok(Json(json!({ "message": "Category updated" })))
}

/// DELETE /api/admin/categories/{id} (ADMIN, STAFF)
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    category::delete_category(&state.pool, id).await?;
    Ok(Json(json!({ "message": "Category deleted" })))
}
