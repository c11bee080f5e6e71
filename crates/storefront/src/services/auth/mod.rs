//! Authentication service.
//!
//! Provides password registration and login, plus the signed session tokens
//! and cookies that carry the resulting identity.

pub mod cookie;
mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TokenError, TokenSigner};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use ddf_core::{Email, Role, User, UserId};

use crate::db::users::UserRepository;
use crate::db::{RepositoryError, Store};

/// Minimum password length, in characters.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Registration form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
}

/// Login form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Authentication service.
///
/// Handles user registration and password login.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            users: UserRepository::new(store),
        }
    }

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if email, password or name is blank.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        self.create_account(registration, Role::Customer).await
    }

    /// Create an account with an explicit role.
    ///
    /// Used by `register` for customers and by the operator CLI for admins.
    ///
    /// # Errors
    ///
    /// Same as [`AuthService::register`].
    #[instrument(skip_all, fields(email = %registration.email, role = %role))]
    pub async fn create_account(
        &self,
        registration: Registration,
        role: Role,
    ) -> Result<User, AuthError> {
        let Registration {
            email,
            password,
            name,
            phone,
        } = registration;

        if email.trim().is_empty() || password.is_empty() || name.trim().is_empty() {
            return Err(AuthError::MissingFields(
                "Email, password, and name are required",
            ));
        }

        let email = Email::parse(email.trim())?;
        validate_password(&password)?;
        let password_hash = hash_password(&password)?;

        let user = User {
            id: UserId::generate(),
            email,
            password_hash,
            name: name.trim().to_owned(),
            role,
            phone: phone.filter(|p| !p.trim().is_empty()),
            created_at: Utc::now(),
        };

        let user = self.users.create(user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })?;

        tracing::info!(user_id = %user.id, "account created");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if either field is blank.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: Credentials) -> Result<User, AuthError> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(AuthError::MissingFields("Email and password are required"));
        }

        // An unparseable address cannot belong to an account.
        let email =
            Email::parse(credentials.email.trim()).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .users
            .get_by_email(&email)
            .await
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&credentials.password, &user.password_hash)?;

        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: &UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await
            .ok_or(AuthError::UserNotFound)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
