//! Order management.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use ddf_core::{Order, OrderId, OrderStatus};

use super::not_found_as;
use crate::db::orders::OrderRepository;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::routes::ApiJson;
use crate::routes::orders::OrderList;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusUpdate {
    pub id: Option<OrderId>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderSaved {
    pub success: bool,
    pub order: Order,
}

/// GET /api/admin/orders - Every order, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Json<OrderList> {
    let orders = OrderRepository::new(state.store()).list_all().await;
    Json(OrderList { orders })
}

/// PUT /api/admin/orders - Overwrite an order's status.
///
/// Any status may be set from any other.
#[tracing::instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(input): ApiJson<StatusUpdate>,
) -> Result<Json<OrderSaved>, AppError> {
    let (Some(id), Some(status)) = (
        input.id.filter(|id| !id.as_str().is_empty()),
        input.status.filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::BadRequest(
            "Order ID and status are required".to_string(),
        ));
    };
    let status: OrderStatus = status
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid order status: {status}")))?;

    let order = OrderRepository::new(state.store())
        .set_status(&id, status)
        .await
        .map_err(not_found_as("Order not found"))?;
    tracing::info!(order_id = %order.id, status = %order.status, "Order status set");
    Ok(Json(OrderSaved {
        success: true,
        order,
    }))
}
