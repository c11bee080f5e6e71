//! Cart operations.
//!
//! Stock is checked when a line is added and again at checkout; it is never
//! reserved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use ddf_core::{
    Cart, CartError, CartId, CartItem, Price, Product, ProductId, UserId, Variant, VariantId,
    cart_total,
};

use crate::db::carts::CartRepository;
use crate::db::{RepositoryError, Store, StoreError};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartServiceError {
    #[error("{0}")]
    MissingFields(&'static str),
    #[error("Product not found")]
    ProductNotFound,
    #[error("Variant not found")]
    VariantNotFound,
    #[error("Insufficient stock")]
    InsufficientStock,
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error("store error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<StoreError> for CartServiceError {
    fn from(err: StoreError) -> Self {
        Self::Repository(err.into())
    }
}

const fn one() -> u32 {
    1
}

/// Body of `POST /api/cart`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    #[serde(default = "one")]
    pub quantity: u32,
}

/// Body of `PUT /api/cart`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartLine {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// Product fields shown next to a cart line.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub images: Vec<String>,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            images: product.images.clone(),
        }
    }
}

/// Variant fields shown next to a cart line.
#[derive(Debug, Clone, Serialize)]
pub struct VariantSummary {
    pub id: VariantId,
    pub weight: String,
    pub price: Price,
    pub stock: i64,
}

impl From<&Variant> for VariantSummary {
    fn from(variant: &Variant) -> Self {
        Self {
            id: variant.id.clone(),
            weight: variant.weight.clone(),
            price: variant.price,
            stock: variant.stock,
        }
    }
}

/// A cart line joined with the current catalog. `product` and `variant` are
/// `null` when the catalog entry has since been removed.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub item: CartItem,
    pub product: Option<ProductSummary>,
    pub variant: Option<VariantSummary>,
}

/// The cart as returned by `GET /api/cart`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<CartId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub items: Vec<CartLineView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Sum of line totals for lines whose variant still exists.
    pub total: Price,
}

impl CartView {
    fn empty() -> Self {
        Self {
            id: None,
            user_id: None,
            items: Vec::new(),
            updated_at: None,
            total: Price::ZERO,
        }
    }

    fn build(cart: Cart, products: &[Product]) -> Self {
        let total = cart_total(&cart.items, products);
        let items = cart
            .items
            .into_iter()
            .map(|item| {
                let product = products.iter().find(|p| p.id == item.product_id);
                let variant = product.and_then(|p| p.variant(&item.variant_id));
                CartLineView {
                    product: product.map(ProductSummary::from),
                    variant: variant.map(VariantSummary::from),
                    item,
                }
            })
            .collect();

        Self {
            id: Some(cart.id),
            user_id: Some(cart.user_id),
            items,
            updated_at: Some(cart.updated_at),
            total,
        }
    }
}

/// Cart service.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            carts: CartRepository::new(store),
        }
    }

    /// The user's cart joined with product and variant details.
    pub async fn view(&self, user_id: &UserId) -> CartView {
        match self.carts.get_with_catalog(user_id).await {
            (Some(cart), products) => CartView::build(cart, &products),
            (None, _) => CartView::empty(),
        }
    }

    /// Add `quantity` of a variant, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::MissingFields` without product and variant ids,
    /// `ProductNotFound`/`VariantNotFound` for unknown catalog entries,
    /// `InsufficientStock` if the variant has fewer than `quantity` units, and
    /// `Cart(InvalidQuantity)` for a zero quantity.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn add(&self, user_id: &UserId, input: AddToCart) -> Result<Cart, CartServiceError> {
        let (Some(product_id), Some(variant_id)) = (
            input.product_id.filter(|id| !id.as_str().is_empty()),
            input.variant_id.filter(|id| !id.as_str().is_empty()),
        ) else {
            return Err(CartServiceError::MissingFields(
                "Product ID and variant ID are required",
            ));
        };
        let quantity = input.quantity;

        self.carts
            .update_with(user_id, |cart, products| {
                let product = products
                    .iter()
                    .find(|p| p.id == product_id)
                    .ok_or(CartServiceError::ProductNotFound)?;
                let variant = product
                    .variant(&variant_id)
                    .ok_or(CartServiceError::VariantNotFound)?;
                if !variant.has_stock_for(quantity) {
                    return Err(CartServiceError::InsufficientStock);
                }
                cart.add_item(product_id.clone(), variant_id.clone(), quantity)?;
                Ok(())
            })
            .await
    }

    /// Set a line's quantity; zero removes the line. Lines not in the cart
    /// are left alone.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::MissingFields` if any field is absent.
    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn update(
        &self,
        user_id: &UserId,
        input: UpdateCartLine,
    ) -> Result<Cart, CartServiceError> {
        let (Some(product_id), Some(variant_id), Some(quantity)) = (
            input.product_id.filter(|id| !id.as_str().is_empty()),
            input.variant_id.filter(|id| !id.as_str().is_empty()),
            input.quantity,
        ) else {
            return Err(CartServiceError::MissingFields(
                "Product ID, variant ID, and quantity are required",
            ));
        };

        self.carts
            .update_with(user_id, |cart, _| {
                cart.set_quantity(&product_id, &variant_id, quantity);
                Ok::<_, CartServiceError>(())
            })
            .await
    }

    /// Delete the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Repository` if the data file cannot be written.
    pub async fn clear(&self, user_id: &UserId) -> Result<(), CartServiceError> {
        Ok(self.carts.clear(user_id).await?)
    }
}
