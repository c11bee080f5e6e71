//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! ddf-cli admin create -e admin@example.com -n "Store Admin" -p 'hunter22'
//! DDF_ADMIN_PASSWORD='hunter22' ddf-cli admin create -e admin@example.com -n "Store Admin"
//! ```
//!
//! Admin accounts cannot be created over HTTP; registration always yields a
//! customer.

use ddf_core::{Role, User};
use ddf_storefront::db::Store;
use ddf_storefront::services::auth::{AuthError, AuthService, Registration};
use thiserror::Error;

/// Environment variable consulted when `--password` is omitted.
pub const PASSWORD_ENV: &str = "DDF_ADMIN_PASSWORD";

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Neither `--password` nor the environment variable was given.
    #[error("No password given. Pass --password or set {PASSWORD_ENV}")]
    MissingPassword,

    /// Account creation failed.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a new admin user.
///
/// # Errors
///
/// Returns `AdminError::MissingPassword` if no password is available, or the
/// `AuthError` from account creation (invalid email, weak password,
/// duplicate email, write failure).
pub async fn create_user(
    store: &Store,
    email: &str,
    name: &str,
    password: Option<String>,
) -> Result<User, AdminError> {
    let password = password
        .or_else(|| std::env::var(PASSWORD_ENV).ok())
        .filter(|p| !p.is_empty())
        .ok_or(AdminError::MissingPassword)?;

    tracing::info!("Creating admin user: {}", email);

    let user = AuthService::new(store)
        .create_account(
            Registration {
                email: email.to_owned(),
                password,
                name: name.to_owned(),
                phone: None,
            },
            Role::Admin,
        )
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(user)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_user_is_admin() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("db.json"));

        let user = create_user(
            &store,
            "Owner@Example.com",
            "Owner",
            Some("s3cure-pass".to_string()),
        )
        .await
        .unwrap();

        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.email.as_str(), "owner@example.com");
        assert_eq!(store.read().await.users.len(), 1);
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("db.json"));
        let password = || Some("s3cure-pass".to_string());

        create_user(&store, "owner@example.com", "Owner", password())
            .await
            .unwrap();
        let err = create_user(&store, "owner@example.com", "Owner", password())
            .await
            .unwrap_err();

        assert!(matches!(err, AdminError::Auth(AuthError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn test_create_user_rejects_short_password() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("db.json"));

        let err = create_user(&store, "owner@example.com", "Owner", Some("abc".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, AdminError::Auth(AuthError::WeakPassword(_))));
    }
}
