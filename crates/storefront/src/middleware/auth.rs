//! Authentication extractors.
//!
//! The session token is read from the `auth_token` cookie, falling back to an
//! `Authorization: Bearer` header, and verified against the server's signing
//! key. No store read happens here; the role in the token is trusted until it
//! expires.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};

use crate::error::{ErrorBody, set_sentry_user};
use crate::models::CurrentUser;
use crate::services::auth::cookie::token_from_headers;
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub CurrentUser);

/// Error returned when a request lacks a usable session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No token was sent.
    NotAuthenticated,
    /// The token is malformed, forged or expired.
    InvalidToken,
    /// The caller is not allowed here.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotAuthenticated => (StatusCode::UNAUTHORIZED, "Not authenticated"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Unauthorized"),
        };
        (
            status,
            Json(ErrorBody {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

fn authenticate(parts: &Parts, state: &AppState) -> Result<CurrentUser, AuthRejection> {
    let token = token_from_headers(&parts.headers).ok_or(AuthRejection::NotAuthenticated)?;
    let claims = state.tokens().verify(&token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        AuthRejection::InvalidToken
    })?;

    let user = CurrentUser::from(claims);
    tracing::Span::current().record("user_id", tracing::field::display(&user.id));
    set_sentry_user(&user.id, Some(&user.email));
    Ok(user)
}

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        authenticate(parts, &state).map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let user = match authenticate(parts, &state) {
            Ok(user) => user,
            Err(AuthRejection::NotAuthenticated) => return Err(AuthRejection::NotAuthenticated),
            // A token that does not verify carries no role, so it cannot be an admin.
            Err(_) => return Err(AuthRejection::Forbidden),
        };
        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Non-admin on admin route");
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if there is no
/// valid session.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        Ok(Self(authenticate(parts, &state).ok()))
    }
}
