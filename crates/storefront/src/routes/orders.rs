//! Customer order history handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use ddf_core::{Order, OrderId};

use crate::db::orders::OrderRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OrderList {
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order: Order,
}

/// GET /api/orders - The caller's orders, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Json<OrderList> {
    let orders = OrderRepository::new(state.store())
        .list_for_user(&user.id)
        .await;
    Json(OrderList { orders })
}

/// GET /api/orders/{id} - One order. Admins may read any order.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = OrderRepository::new(state.store())
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    if !order.belongs_to(&user.id) && !user.is_admin() {
        return Err(AppError::Forbidden("Unauthorized".to_string()));
    }
    Ok(Json(OrderResponse { order }))
}
