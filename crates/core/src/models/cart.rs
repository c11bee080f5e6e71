//! Shopping carts.
//!
//! Each user has at most one cart. A cart line is keyed by the
//! (product, variant) pair; adding the same pair twice merges the lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CartId, ProductId, UserId, VariantId};

/// Errors from cart arithmetic.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Quantities added to a cart must be at least one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

/// A (product, variant, quantity) line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub quantity: u32,
}

impl CartItem {
    fn is_line(&self, product_id: &ProductId, variant_id: &VariantId) -> bool {
        &self.product_id == product_id && &self.variant_id == variant_id
    }
}

/// A user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// An empty cart for `user_id`.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            id: CartId::generate(),
            user_id,
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// The line for (product, variant), if present.
    #[must_use]
    pub fn line(&self, product_id: &ProductId, variant_id: &VariantId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.is_line(product_id, variant_id))
    }

    /// Add `quantity` units, merging into an existing line when there is one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] when `quantity` is zero.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        variant_id: VariantId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        match self
            .items
            .iter_mut()
            .find(|i| i.is_line(&product_id, &variant_id))
        {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.items.push(CartItem {
                product_id,
                variant_id,
                quantity,
            }),
        }
        self.touch();
        Ok(())
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// A line that is not in the cart is left absent; the call is a no-op.
    pub fn set_quantity(&mut self, product_id: &ProductId, variant_id: &VariantId, quantity: u32) {
        if quantity == 0 {
            self.items.retain(|i| !i.is_line(product_id, variant_id));
        } else if let Some(line) = self
            .items
            .iter_mut()
            .find(|i| i.is_line(product_id, variant_id))
        {
            line.quantity = quantity;
        }
        self.touch();
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
        self.touch();
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
