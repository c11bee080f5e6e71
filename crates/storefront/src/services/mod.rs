//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration, password login, session tokens and cookies
//! - `cart` - Cart arithmetic against the live catalog
//! - `checkout` - Order placement and payment verification
//! - `payment` - Razorpay gateway client and signature checks
//! - `upload` - Product image storage

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod payment;
pub mod upload;
