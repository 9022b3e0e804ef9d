//! User data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A principal's single role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Regular user.
    #[default]
    User,
    /// Administrator (may manage the tool catalog).
    Admin,
}

impl UserRole {
    /// Authority string carried in tokens and security contexts.
    pub fn authority(&self) -> &'static str {
        match self {
            UserRole::User => "ROLE_USER",
            UserRole::Admin => "ROLE_ADMIN",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::User => write!(f, "USER"),
            UserRole::Admin => write!(f, "ADMIN"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        match upper.strip_prefix("ROLE_").unwrap_or(&upper) {
            "USER" => Ok(UserRole::User),
            "ADMIN" => Ok(UserRole::Admin),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

/// A stored principal.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Immutable identifier (`usr_...`).
    pub id: String,
    /// Unique login name; also the token subject.
    pub username: String,
    pub email: String,
    /// bcrypt hash. `None` for principals provisioned through GitHub sign-in.
    pub password_hash: Option<String>,
    pub role: UserRole,
    pub is_premium: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A principal to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    /// Already hashed; never a plaintext password.
    pub password_hash: Option<String>,
    pub role: UserRole,
}

/// Public view of a user (no credential material).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub is_premium: bool,
    pub created_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            is_premium: user.is_premium,
            created_at: user.created_at,
        }
    }
}
