//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST   /api/auth/register        - Create a customer account, set session cookie
//! POST   /api/auth/login           - Password login, set session cookie
//! POST   /api/auth/logout          - Clear session cookie
//! GET    /api/auth/me              - Current user
//!
//! # Catalog
//! GET    /api/products             - Product listing (?category=&search=)
//! GET    /api/products/{key}       - Product by id or slug
//! GET    /api/categories           - Categories with product counts
//!
//! # Cart (requires auth)
//! GET    /api/cart                 - Cart with product details and total
//! POST   /api/cart                 - Add a line
//! PUT    /api/cart                 - Set a line's quantity (0 removes)
//! DELETE /api/cart                 - Clear the cart
//!
//! # Checkout (requires auth)
//! POST   /api/checkout             - Place a pending order, open gateway order
//! POST   /api/payment/verify       - Verify gateway signature, confirm order
//! GET    /api/orders               - Own orders
//! GET    /api/orders/{id}          - One order (owner or admin)
//!
//! # Admin (requires admin role)
//! GET    /api/admin/orders         - All orders
//! PUT    /api/admin/orders         - Set order status
//! POST   /api/admin/products       - Create product
//! PUT    /api/admin/products       - Update product
//! DELETE /api/admin/products?id=   - Delete product
//! POST   /api/admin/categories     - Create category
//! PUT    /api/admin/categories     - Update category
//! DELETE /api/admin/categories?id= - Delete category
//! POST   /api/admin/upload         - Upload product image (multipart `image`)
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRequest, FromRequestParts},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::{auth_rate_limiter, rate_limited_as_json};
use crate::services::upload::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// JSON body extractor whose rejections use the API error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections use the API error shape.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// `{"success": true}`.
#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub const OK: Self = Self { success: true };
}

/// `?id=` query of the admin delete endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    /// The id, or a 400 with `message` when it is absent or blank.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the id is missing.
    pub fn require(self, message: &str) -> Result<String, AppError> {
        self.id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest(message.to_string()))
    }
}

/// Create the auth routes router.
///
/// When `rate_limit` is set every auth endpoint shares a per-IP limiter.
pub fn auth_routes(rate_limit: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me));

    if rate_limit {
        router
            .layer(auth_rate_limiter())
            .layer(axum::middleware::map_response(rate_limited_as_json))
    } else {
        router
    }
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/orders",
            get(admin::orders::index).put(admin::orders::update_status),
        )
        .route(
            "/products",
            post(admin::products::create)
                .put(admin::products::update)
                .delete(admin::products::delete),
        )
        .route(
            "/categories",
            post(admin::categories::create)
                .put(admin::categories::update)
                .delete(admin::categories::delete),
        )
        .route(
            "/upload",
            // Leave headroom over the image limit for multipart framing.
            post(admin::upload::upload).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024)),
        )
}

/// Create all `/api` routes.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes(rate_limit))
        .route("/api/products", get(catalog::list_products))
        .route("/api/products/{key}", get(catalog::show_product))
        .route("/api/categories", get(catalog::list_categories))
        .route(
            "/api/cart",
            get(cart::show)
                .post(cart::add)
                .put(cart::update)
                .delete(cart::clear),
        )
        .route("/api/checkout", post(checkout::checkout))
        .route("/api/payment/verify", post(checkout::verify_payment))
        .route("/api/orders", get(orders::index))
        .route("/api/orders/{id}", get(orders::show))
        .nest("/api/admin", admin_routes())
}
