//! User views.
//!
//! `ddf_core::User` carries the password hash and is never serialized to
//! clients. These types are what handlers see and send instead.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ddf_core::{Email, Role, User, UserId};

use crate::services::auth::Claims;

/// The authenticated caller, taken from a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// User id.
    pub id: UserId,
    /// User's email address.
    pub email: String,
    /// Role at the time the token was issued.
    pub role: Role,
}

impl CurrentUser {
    /// Whether the caller may use the admin back-office.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.user_id,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Public user fields returned by the auth endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            phone: user.phone,
            created_at: user.created_at,
        }
    }
}
