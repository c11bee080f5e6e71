//! Request-scoped and response-facing models for the storefront.

pub mod user;

pub use user::{CurrentUser, UserView};
