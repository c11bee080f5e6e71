//! Public catalog route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use ddf_core::Product;

use crate::db::categories::{CategoryRepository, CategoryWithCount};
use crate::db::products::{ProductFilter, ProductRepository};
use crate::error::AppError;
use crate::routes::ApiQuery;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub product: Product,
}

#[derive(Debug, Serialize)]
pub struct CategoryList {
    pub categories: Vec<CategoryWithCount>,
}

/// GET /api/products - Products, optionally filtered by `category` id and
/// a case-insensitive `search` over name and description.
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ProductFilter>,
) -> Json<ProductList> {
    let products = ProductRepository::new(state.store()).list(&filter).await;
    Json(ProductList { products })
}

/// GET /api/products/{key} - One product by id or slug.
pub async fn show_product(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ProductResponse>, AppError> {
    ProductRepository::new(state.store())
        .get_by_id_or_slug(&key)
        .await
        .map(|product| Json(ProductResponse { product }))
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// GET /api/categories - Categories by display order with product counts.
pub async fn list_categories(State(state): State<AppState>) -> Json<CategoryList> {
    let categories = CategoryRepository::new(state.store())
        .list_with_counts()
        .await;
    Json(CategoryList { categories })
}
