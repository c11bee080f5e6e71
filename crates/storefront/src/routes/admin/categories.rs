//! Category management.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use ddf_core::{Category, CategoryId};

use super::not_found_as;
use crate::db::categories::{CategoryRepository, CategoryUpdate, NewCategory};
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::routes::{ApiJson, ApiQuery, IdQuery, Success};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CategorySaved {
    pub success: bool,
    pub category: Category,
}

#[derive(Debug, Deserialize)]
pub struct CategoryPatch {
    #[serde(default)]
    pub id: Option<CategoryId>,
    #[serde(flatten)]
    pub update: CategoryUpdate,
}

/// POST /api/admin/categories - Create a category.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiJson(input): ApiJson<NewCategory>,
) -> Result<Json<CategorySaved>, AppError> {
    if input.name.trim().is_empty() || input.slug.trim().is_empty() {
        return Err(AppError::BadRequest("Name and slug are required".to_string()));
    }

    let category = CategoryRepository::new(state.store()).create(input).await?;
    tracing::info!(category_id = %category.id, "Category created");
    Ok(Json(CategorySaved {
        success: true,
        category,
    }))
}

/// PUT /api/admin/categories - Partially update a category.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiJson(patch): ApiJson<CategoryPatch>,
) -> Result<Json<CategorySaved>, AppError> {
    let id = patch
        .id
        .filter(|id| !id.as_str().is_empty())
        .ok_or_else(|| AppError::BadRequest("Category ID is required".to_string()))?;

    let category = CategoryRepository::new(state.store())
        .update(&id, patch.update)
        .await
        .map_err(not_found_as("Category not found"))?;
    Ok(Json(CategorySaved {
        success: true,
        category,
    }))
}

/// DELETE /api/admin/categories?id= - Delete a category. Products keep
/// their `categoryId`.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    ApiQuery(query): ApiQuery<IdQuery>,
) -> Result<Json<Success>, AppError> {
    let id = CategoryId::new(query.require("Category ID is required")?);

    CategoryRepository::new(state.store())
        .delete(&id)
        .await
        .map_err(not_found_as("Category not found"))?;
    tracing::info!(category_id = %id, "Category deleted");
    Ok(Json(Success::OK))
}
