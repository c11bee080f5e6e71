//! Product management.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use ddf_core::{Product, ProductId};

use super::not_found_as;
use crate::db::products::{NewProduct, ProductRepository, ProductUpdate};
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::routes::{ApiJson, ApiQuery, IdQuery, Success};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProductSaved {
    pub success: bool,
    pub product: Product,
}

/// Body of the update endpoint: the product id plus any fields to change.
#[derive(Debug, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(flatten)]
    pub update: ProductUpdate,
}

/// POST /api/admin/products - Create a product.
#[tracing::instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(input): ApiJson<NewProduct>,
) -> Result<Json<ProductSaved>, AppError> {
    if !input.has_required_fields() {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    let product = ProductRepository::new(state.store()).create(input).await?;
    tracing::info!(product_id = %product.id, slug = %product.slug, "Product created");
    Ok(Json(ProductSaved {
        success: true,
        product,
    }))
}

/// PUT /api/admin/products - Partially update a product.
#[tracing::instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> Result<Json<ProductSaved>, AppError> {
    let id = patch
        .id
        .filter(|id| !id.as_str().is_empty())
        .ok_or_else(|| AppError::BadRequest("Product ID is required".to_string()))?;

    let product = ProductRepository::new(state.store())
        .update(&id, patch.update)
        .await
        .map_err(not_found_as("Product not found"))?;
    tracing::info!(product_id = %product.id, "Product updated");
    Ok(Json(ProductSaved {
        success: true,
        product,
    }))
}

/// DELETE /api/admin/products?id= - Delete a product.
#[tracing::instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiQuery(query): ApiQuery<IdQuery>,
) -> Result<Json<Success>, AppError> {
    let id = ProductId::new(query.require("Product ID is required")?);

    ProductRepository::new(state.store())
        .delete(&id)
        .await
        .map_err(not_found_as("Product not found"))?;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(Json(Success::OK))
}
