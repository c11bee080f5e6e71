//! Checkout and payment verification.
//!
//! Checkout prices the cart, opens a gateway order for the total and records
//! a `pending` order carrying the gateway order id. The cart is left intact
//! until the payment is verified; verification confirms the order, takes the
//! stock and clears the cart in a single store write.

use chrono::Utc;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use ddf_core::{
    Address, Order, OrderId, OrderNumber, OrderStatus, Price, PricingError, UserId, price_cart,
};

use super::payment::{GatewayOrder, PaymentError, PaymentGateway, verify_signature};
use crate::db::carts::CartRepository;
use crate::db::orders::{OrderRepository, PaymentOutcome};
use crate::db::{RepositoryError, Store};

/// Errors from checkout and payment verification.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Complete shipping address is required")]
    IncompleteAddress,
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error("order total {0} cannot be charged")]
    InvalidAmount(Price),
    #[error("Missing payment verification data")]
    MissingPaymentData,
    #[error("Invalid payment signature")]
    InvalidSignature,
    #[error("Payment does not belong to this order")]
    GatewayOrderMismatch,
    #[error("Order not found")]
    OrderNotFound,
    #[error("Unauthorized")]
    NotOrderOwner,
    #[error("payment gateway error: {0}")]
    Payment(#[from] PaymentError),
    #[error("store error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Body of `POST /api/checkout`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub shipping_address: Option<Address>,
}

/// Body of `POST /api/payment/verify`, as posted by the gateway's checkout
/// widget.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PaymentVerification {
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub order_id: Option<OrderId>,
}

/// A placed order and the gateway order the client must pay.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub gateway_order: GatewayOrder,
}

/// Order fields returned from checkout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub id: OrderId,
    pub order_number: OrderNumber,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Price>,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    carts: CartRepository<'a>,
    orders: OrderRepository<'a>,
    gateway: &'a dyn PaymentGateway,
    key_secret: &'a SecretString,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub fn new(
        store: &'a Store,
        gateway: &'a dyn PaymentGateway,
        key_secret: &'a SecretString,
    ) -> Self {
        Self {
            carts: CartRepository::new(store),
            orders: OrderRepository::new(store),
            gateway,
            key_secret,
        }
    }

    /// Turn the user's cart into a pending order.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::IncompleteAddress` if a required address field
    /// is blank, `Pricing` if the cart is empty or a line cannot be priced,
    /// and `Payment` if the gateway order cannot be created.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn checkout(
        &self,
        user_id: &UserId,
        request: CheckoutRequest,
    ) -> Result<PlacedOrder, CheckoutError> {
        let address = request
            .shipping_address
            .filter(Address::is_complete)
            .ok_or(CheckoutError::IncompleteAddress)?;

        let (cart, products) = self.carts.get_with_catalog(user_id).await;
        let items = cart.map(|c| c.items).unwrap_or_default();
        let (lines, totals) = price_cart(&items, &products)?;

        let amount = totals
            .total
            .to_paise()
            .ok_or(CheckoutError::InvalidAmount(totals.total))?;
        let receipt = format!("receipt_{}", Utc::now().timestamp_millis());
        let gateway_order = self.gateway.create_order(amount, &receipt).await?;

        let now = Utc::now();
        let order = Order {
            id: OrderId::generate(),
            order_number: OrderNumber::generate_for_order(),
            user_id: user_id.clone(),
            items: lines,
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            tax: totals.tax,
            total: totals.total,
            status: OrderStatus::Pending,
            shipping_address: address,
            payment_id: None,
            razorpay_order_id: Some(gateway_order.id.clone()),
            razorpay_payment_id: None,
            razorpay_signature: None,
            created_at: now,
            updated_at: now,
        };
        let order = self.orders.create(order).await?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total,
            "Order placed"
        );
        Ok(PlacedOrder {
            order,
            gateway_order,
        })
    }

    /// Verify a payment signature and confirm the order.
    ///
    /// Verifying an order that is no longer pending returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::MissingPaymentData` if any field is blank,
    /// `InvalidSignature` if the HMAC does not match, `OrderNotFound`,
    /// `NotOrderOwner` for another user's order, and `GatewayOrderMismatch`
    /// if the gateway order id is not the one recorded at checkout.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn verify_payment(
        &self,
        user_id: &UserId,
        verification: PaymentVerification,
    ) -> Result<Order, CheckoutError> {
        let present = |value: Option<String>| value.filter(|v| !v.is_empty());
        let (Some(gateway_order_id), Some(payment_id), Some(signature), Some(order_id)) = (
            present(verification.razorpay_order_id),
            present(verification.razorpay_payment_id),
            present(verification.razorpay_signature),
            verification.order_id.filter(|id| !id.as_str().is_empty()),
        ) else {
            return Err(CheckoutError::MissingPaymentData);
        };

        if !verify_signature(self.key_secret, &gateway_order_id, &payment_id, &signature) {
            tracing::warn!(order_id = %order_id, "Payment signature mismatch");
            return Err(CheckoutError::InvalidSignature);
        }

        let order = self
            .orders
            .get(&order_id)
            .await
            .ok_or(CheckoutError::OrderNotFound)?;
        if !order.belongs_to(user_id) {
            return Err(CheckoutError::NotOrderOwner);
        }
        if order.razorpay_order_id.as_deref() != Some(gateway_order_id.as_str()) {
            return Err(CheckoutError::GatewayOrderMismatch);
        }

        let outcome = self
            .orders
            .confirm_payment(&order_id, &payment_id, &signature)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CheckoutError::OrderNotFound,
                other => CheckoutError::Repository(other),
            })?;

        match &outcome {
            PaymentOutcome::Confirmed(order) => {
                tracing::info!(order_id = %order.id, "Payment verified, order confirmed");
            }
            PaymentOutcome::AlreadyProcessed(order) => {
                tracing::info!(order_id = %order.id, status = %order.status, "Payment already recorded");
            }
        }
        Ok(outcome.into_order())
    }
}
