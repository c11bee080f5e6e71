//! Delicious Dry Fruits Core - Shared types library.
//!
//! This crate provides the types and pure domain logic used across all
//! storefront components:
//! - `storefront` - Public JSON API and admin back-office
//! - `cli` - Command-line tools for catalog import and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no file access,
//! no HTTP clients. Everything here can be unit tested without a runtime.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, and statuses
//! - [`models`] - Persisted entities and the whole-store [`models::Dataset`]
//! - [`pricing`] - Checkout arithmetic (subtotal, shipping, tax, total)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod pricing;
pub mod types;

pub use models::*;
pub use pricing::{OrderTotals, PricingError, cart_total, price_cart};
pub use types::*;
