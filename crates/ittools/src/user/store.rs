//! Credential store seam used by the authentication core.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{NewUser, User};

/// Lookup and persistence capability the authentication core needs:
/// point lookups, an existence check and inserts.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a principal by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Find a principal by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Check whether a username is already taken.
    async fn exists_by_username(&self, username: &str) -> Result<bool>;

    /// Insert a new principal. Fails on a username or email collision.
    async fn save(&self, user: NewUser) -> Result<User>;

    /// Insert a principal for an external identity unless one with the same
    /// email already exists, then return whichever row holds that email.
    ///
    /// Returns `None` when the username already belongs to a principal with
    /// a different email; the caller has to pick another name.
    ///
    /// Must be atomic with respect to the email key.
    async fn provision_external(&self, user: NewUser) -> Result<Option<User>>;
}

/// Whether an error chain bottoms out in a unique-constraint violation.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .is_some_and(|db| db.is_unique_violation())
    })
}
