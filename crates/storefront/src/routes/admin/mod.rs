//! Admin back-office handlers.
//!
//! Every handler takes [`RequireAdmin`](crate::middleware::RequireAdmin):
//! no token is a 401, anything but a valid admin token is a 403.

pub mod categories;
pub mod orders;
pub mod products;
pub mod upload;

use crate::db::RepositoryError;
use crate::error::AppError;

/// Map a repository `NotFound` to a 404 carrying `message`.
fn not_found_as(message: &'static str) -> impl FnOnce(RepositoryError) -> AppError {
    move |err| match err {
        RepositoryError::NotFound => AppError::NotFound(message.to_string()),
        other => other.into(),
    }
}
