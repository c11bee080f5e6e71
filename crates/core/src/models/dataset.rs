//! The whole persisted state of the store.

use serde::{Deserialize, Serialize};

use super::{Cart, Category, Order, Product, User};

/// Every record of every type. Missing collections parse as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub carts: Vec<Cart>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl Dataset {
    /// Total number of records across all collections.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.users.len()
            + self.products.len()
            + self.categories.len()
            + self.carts.len()
            + self.orders.len()
    }
}
