//! Persisted entities.
//!
//! Every entity serializes with camelCase keys, which is the on-disk format of
//! the data file and the wire format of the JSON API.

pub mod cart;
pub mod category;
pub mod dataset;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartError, CartItem};
pub use category::Category;
pub use dataset::Dataset;
pub use order::{Address, Order, OrderItem};
pub use product::{NutritionalInfo, Product, Variant};
pub use user::User;
