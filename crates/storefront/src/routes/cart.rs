//! Cart route handlers. Every endpoint acts on the caller's own cart.

use axum::{Json, extract::State};
use serde::Serialize;

use ddf_core::Cart;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::routes::{ApiJson, Success};
use crate::services::cart::{AddToCart, CartService, CartView, UpdateCartLine};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub cart: CartView,
}

#[derive(Debug, Serialize)]
pub struct CartUpdated {
    pub success: bool,
    pub cart: Cart,
}

/// GET /api/cart - Cart lines with product and variant details, plus total.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Json<CartResponse> {
    let cart = CartService::new(state.store()).view(&user.id).await;
    Json(CartResponse { cart })
}

/// POST /api/cart - Add a line or increase an existing one.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(input): ApiJson<AddToCart>,
) -> Result<Json<CartUpdated>, AppError> {
    let cart = CartService::new(state.store()).add(&user.id, input).await?;
    Ok(Json(CartUpdated {
        success: true,
        cart,
    }))
}

/// PUT /api/cart - Set a line's quantity; 0 removes the line.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(input): ApiJson<UpdateCartLine>,
) -> Result<Json<CartUpdated>, AppError> {
    let cart = CartService::new(state.store())
        .update(&user.id, input)
        .await?;
    Ok(Json(CartUpdated {
        success: true,
        cart,
    }))
}

/// DELETE /api/cart - Remove the cart.
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Success>, AppError> {
    CartService::new(state.store()).clear(&user.id).await?;
    Ok(Json(Success::OK))
}
