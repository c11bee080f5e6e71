//! Auth route handlers.
//!
//! Successful register and login responses set the `auth_token` cookie and
//! return the user; the same token also works as a bearer token.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Serialize;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::UserView;
use crate::routes::{ApiJson, Success};
use crate::services::auth::cookie::{cleared_cookie, session_cookie};
use crate::services::auth::{AuthService, Credentials, Registration};
use crate::state::AppState;

/// `{"success": true, "user": {...}}`.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserView,
}

/// `{"user": {...}}`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserView,
}

fn session_response(
    state: &AppState,
    status: StatusCode,
    user: ddf_core::User,
) -> Result<Response, AppError> {
    let token = state
        .tokens()
        .issue(&user)
        .map_err(|e| AppError::Internal(format!("failed to issue token: {e}")))?;
    let cookie = session_cookie(
        &token,
        state.tokens().ttl_seconds(),
        state.config().auth.secure_cookies,
    );
    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok((
        status,
        AppendHeaders([(SET_COOKIE, cookie.to_string())]),
        Json(AuthResponse {
            success: true,
            user: user.into(),
        }),
    )
        .into_response())
}

/// POST /api/auth/register - Create a customer account.
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(registration): ApiJson<Registration>,
) -> Result<Response, AppError> {
    let user = AuthService::new(state.store())
        .register(registration)
        .await?;
    session_response(&state, StatusCode::CREATED, user)
}

/// POST /api/auth/login - Password login.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<Response, AppError> {
    let user = AuthService::new(state.store()).login(credentials).await?;
    tracing::info!(user_id = %user.id, "User logged in");
    session_response(&state, StatusCode::OK, user)
}

/// POST /api/auth/logout - Clear the session cookie.
///
/// Always succeeds, with or without a valid session. Tokens are stateless,
/// so a copy of the token kept elsewhere stays valid until it expires.
pub async fn logout(
    State(state): State<AppState>,
    OptionalAuth(current): OptionalAuth,
) -> impl IntoResponse {
    if let Some(user) = current {
        tracing::info!(user_id = %user.id, "User logged out");
    }
    clear_sentry_user();
    (
        AppendHeaders([(
            SET_COOKIE,
            cleared_cookie(state.config().auth.secure_cookies).to_string(),
        )]),
        Json(Success::OK),
    )
}

/// GET /api/auth/me - The signed-in user.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<MeResponse>, AppError> {
    let user = AuthService::new(state.store())
        .get_user(&current.id)
        .await?;
    Ok(Json(MeResponse { user: user.into() }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use tempfile::TempDir;

    use super::*;
    use crate::config::{AuthConfig, RazorpayConfig, StorefrontConfig};

    fn state(dir: &TempDir) -> AppState {
        AppState::new(StorefrontConfig {
            data_file: dir.path().join("db.json"),
            public_dir: dir.path().join("public"),
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            auth: AuthConfig {
                token_secret: SecretString::from("x7Kq2mPz9vLw4tRb8nYc3hJd6fGs1aQe".to_string()),
                token_ttl_days: 7,
                secure_cookies: true,
            },
            razorpay: RazorpayConfig {
                key_id: "rzp_test_key".to_string(),
                key_secret: SecretString::from("rzp_secret_for_tests".to_string()),
                api_base: "http://127.0.0.1:9".to_string(),
            },
            rate_limit: false,
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
        })
        .unwrap()
    }

    fn set_cookie(response: &Response) -> String {
        response.headers()[SET_COOKIE].to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_register_and_login_set_session_cookie() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);

        let registered = register(
            State(state.clone()),
            ApiJson(Registration {
                email: "kavya@example.com".to_string(),
                password: "raisins".to_string(),
                name: "Kavya".to_string(),
                phone: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(registered.status(), StatusCode::CREATED);
        let cookie = set_cookie(&registered);
        assert!(cookie.starts_with("auth_token="));
        assert!(cookie.contains("Secure"));

        let logged_in = login(
            State(state),
            ApiJson(Credentials {
                email: "kavya@example.com".to_string(),
                password: "raisins".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(logged_in.status(), StatusCode::OK);
        assert!(set_cookie(&logged_in).contains("HttpOnly"));
    }
}
