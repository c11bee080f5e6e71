//! Checkout pricing.
//!
//! Shipping and tax are fixed house policy: orders strictly above ₹999 ship
//! free, everything else pays a flat ₹50, and GST is 5% of the subtotal
//! rounded to whole rupees.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{CartItem, OrderItem, Product};
use crate::types::{Price, ProductId, VariantId};

/// Subtotals strictly above this ship free.
pub const FREE_SHIPPING_ABOVE: i64 = 999;

/// Shipping charged at or below [`FREE_SHIPPING_ABOVE`].
pub const FLAT_SHIPPING: i64 = 50;

/// Tax rate applied to the subtotal (5%).
pub const TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Errors raised while pricing a cart.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),
    #[error("Variant {0} not found")]
    VariantNotFound(VariantId),
    #[error("Insufficient stock for {product} - {weight}")]
    InsufficientStock { product: String, weight: String },
}

/// Subtotal, shipping, tax and grand total of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

impl OrderTotals {
    /// Apply the shipping and tax policy to a subtotal.
    #[must_use]
    pub fn from_subtotal(subtotal: Price) -> Self {
        let shipping = if subtotal > Price::from_rupees(FREE_SHIPPING_ABOVE) {
            Price::ZERO
        } else {
            Price::from_rupees(FLAT_SHIPPING)
        };
        let tax = subtotal.percent_rounded(TAX_RATE);
        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}

/// Price every cart line against the current catalog.
///
/// Each line must reference an existing product and variant with enough
/// stock. Lines are snapshotted into [`OrderItem`]s in cart order.
///
/// # Errors
///
/// Returns the first [`PricingError`] encountered, or
/// [`PricingError::EmptyCart`] when there are no lines.
pub fn price_cart(
    items: &[CartItem],
    products: &[Product],
) -> Result<(Vec<OrderItem>, OrderTotals), PricingError> {
    if items.is_empty() {
        return Err(PricingError::EmptyCart);
    }

    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let product = products
            .iter()
            .find(|p| p.id == item.product_id)
            .ok_or_else(|| PricingError::ProductNotFound(item.product_id.clone()))?;
        let variant = product
            .variant(&item.variant_id)
            .ok_or_else(|| PricingError::VariantNotFound(item.variant_id.clone()))?;

        if !variant.has_stock_for(item.quantity) {
            return Err(PricingError::InsufficientStock {
                product: product.name.clone(),
                weight: variant.weight.clone(),
            });
        }

        lines.push(OrderItem {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            variant_id: variant.id.clone(),
            variant_weight: variant.weight.clone(),
            quantity: item.quantity,
            price: variant.price,
            total: variant.price.times(item.quantity),
        });
    }

    let subtotal = lines.iter().map(|l| l.total).sum();
    Ok((lines, OrderTotals::from_subtotal(subtotal)))
}

/// Value of the cart at current prices. Lines whose product or variant has
/// disappeared from the catalog contribute nothing.
#[must_use]
pub fn cart_total(items: &[CartItem], products: &[Product]) -> Price {
    items
        .iter()
        .filter_map(|item| {
            products
                .iter()
                .find(|p| p.id == item.product_id)
                .and_then(|p| p.variant(&item.variant_id))
                .map(|v| v.price.times(item.quantity))
        })
        .sum()
}
