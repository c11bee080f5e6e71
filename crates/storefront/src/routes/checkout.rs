//! Checkout and payment verification handlers.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::routes::ApiJson;
use crate::services::checkout::{
    CheckoutRequest, CheckoutService, OrderReceipt, PaymentVerification,
};
use crate::services::payment::GatewayOrder;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub success: bool,
    pub order: OrderReceipt,
    pub razorpay_order: GatewayOrder,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub order: OrderReceipt,
}

fn service(state: &AppState) -> CheckoutService<'_> {
    CheckoutService::new(
        state.store(),
        state.gateway(),
        &state.config().razorpay.key_secret,
    )
}

/// POST /api/checkout - Place a pending order for the cart and open the
/// matching gateway order.
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let placed = service(&state).checkout(&user.id, request).await?;

    Ok(Json(CheckoutResponse {
        success: true,
        order: OrderReceipt {
            id: placed.order.id,
            order_number: placed.order.order_number,
            total: Some(placed.order.total),
        },
        razorpay_order: placed.gateway_order,
    }))
}

/// POST /api/payment/verify - Check the gateway signature and confirm the order.
pub async fn verify_payment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(verification): ApiJson<PaymentVerification>,
) -> Result<Json<VerifyResponse>, AppError> {
    let order = service(&state)
        .verify_payment(&user.id, verification)
        .await?;

    Ok(Json(VerifyResponse {
        success: true,
        order: OrderReceipt {
            id: order.id,
            order_number: order.order_number,
            total: None,
        },
    }))
}
