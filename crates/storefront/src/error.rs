//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`;
//! every error leaves the server as `{"error": "<message>"}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use ddf_core::PricingError;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::cart::CartServiceError;
use crate::services::checkout::CheckoutError;
use crate::services::upload::UploadError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed.
    #[error("Store error: {0}")]
    Repository(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartServiceError),

    /// Checkout or payment verification failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Image upload failed.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Too many requests from this client.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

const INTERNAL: &str = "Internal server error";

impl AppError {
    /// HTTP status and client-facing message.
    ///
    /// Messages for 5xx responses never include internal details.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Repository(err) => repository_status(err),
            Self::Auth(err) => auth_status(err),
            Self::Cart(err) => cart_status(err),
            Self::Checkout(err) => checkout_status(err),
            Self::Upload(err) => match err {
                UploadError::Io(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to upload image".to_string(),
                ),
                other => (StatusCode::BAD_REQUEST, other.to_string()),
            },
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests".to_string(),
            ),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string()),
        }
    }
}

fn repository_status(err: &RepositoryError) -> (StatusCode, String) {
    match err {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
        RepositoryError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        RepositoryError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string()),
    }
}

fn auth_status(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::MissingFields(msg) => (StatusCode::BAD_REQUEST, (*msg).to_string()),
        AuthError::InvalidEmail(_) => (StatusCode::BAD_REQUEST, "Invalid email format".to_string()),
        AuthError::WeakPassword(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        AuthError::UserAlreadyExists => (
            StatusCode::CONFLICT,
            "User with this email already exists".to_string(),
        ),
        AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "Invalid email or password".to_string(),
        ),
        AuthError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
        AuthError::Repository(err) => repository_status(err),
        AuthError::Token(_) | AuthError::PasswordHash => {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
        }
    }
}

fn cart_status(err: &CartServiceError) -> (StatusCode, String) {
    match err {
        CartServiceError::ProductNotFound | CartServiceError::VariantNotFound => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        CartServiceError::MissingFields(_)
        | CartServiceError::InsufficientStock
        | CartServiceError::Cart(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        CartServiceError::Repository(err) => repository_status(err),
    }
}

fn checkout_status(err: &CheckoutError) -> (StatusCode, String) {
    match err {
        CheckoutError::IncompleteAddress
        | CheckoutError::MissingPaymentData
        | CheckoutError::InvalidSignature
        | CheckoutError::GatewayOrderMismatch => (StatusCode::BAD_REQUEST, err.to_string()),
        CheckoutError::Pricing(pricing) => match pricing {
            PricingError::ProductNotFound(_) | PricingError::VariantNotFound(_) => {
                (StatusCode::NOT_FOUND, pricing.to_string())
            }
            PricingError::EmptyCart | PricingError::InsufficientStock { .. } => {
                (StatusCode::BAD_REQUEST, pricing.to_string())
            }
        },
        CheckoutError::OrderNotFound => (StatusCode::NOT_FOUND, err.to_string()),
        CheckoutError::NotOrderOwner => (StatusCode::FORBIDDEN, err.to_string()),
        CheckoutError::Payment(_) => (
            StatusCode::BAD_GATEWAY,
            "Payment gateway error".to_string(),
        ),
        CheckoutError::InvalidAmount(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_string())
        }
        CheckoutError::Repository(err) => repository_status(err),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Product not found".to_string());
        assert_eq!(err.to_string(), "Not found: Product not found");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let (status, body) = render(AppError::NotFound("Product not found".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({"error": "Product not found"}));
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let (status, body) = render(AppError::Internal("disk on fire".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");

        let (status, body) = render(CheckoutError::Payment(
            crate::services::payment::PaymentError::Api {
                status: 401,
                message: "bad key rzp_live_secret".to_string(),
            },
        )
        .into())
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Payment gateway error");
    }

    #[tokio::test]
    async fn test_domain_error_statuses() {
        let cases: Vec<(AppError, StatusCode, &str)> = vec![
            (
                AuthError::UserAlreadyExists.into(),
                StatusCode::CONFLICT,
                "User with this email already exists",
            ),
            (
                AuthError::WeakPassword("Password must be at least 6 characters long".into())
                    .into(),
                StatusCode::BAD_REQUEST,
                "Password must be at least 6 characters long",
            ),
            (
                CartServiceError::VariantNotFound.into(),
                StatusCode::NOT_FOUND,
                "Variant not found",
            ),
            (
                CartServiceError::InsufficientStock.into(),
                StatusCode::BAD_REQUEST,
                "Insufficient stock",
            ),
            (
                CheckoutError::Pricing(PricingError::EmptyCart).into(),
                StatusCode::BAD_REQUEST,
                "Cart is empty",
            ),
            (
                CheckoutError::Pricing(PricingError::ProductNotFound("p1".into())).into(),
                StatusCode::NOT_FOUND,
                "Product p1 not found",
            ),
            (
                CheckoutError::NotOrderOwner.into(),
                StatusCode::FORBIDDEN,
                "Unauthorized",
            ),
            (
                UploadError::TooLarge.into(),
                StatusCode::BAD_REQUEST,
                "Image must be under 5MB",
            ),
            (
                RepositoryError::Conflict("Slug already in use".into()).into(),
                StatusCode::CONFLICT,
                "Slug already in use",
            ),
            (AppError::RateLimited, StatusCode::TOO_MANY_REQUESTS, "Too many requests"),
        ];

        for (err, status, message) in cases {
            let (actual_status, body) = render(err).await;
            assert_eq!(actual_status, status, "{message}");
            assert_eq!(body["error"], message);
        }
    }
}
