//! User repository for database operations.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{NewUser, User};
use super::store::{CredentialStore, is_unique_violation};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, role, is_premium, created_at, updated_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn generate_id() -> String {
        format!("usr_{}", nanoid::nanoid!(12))
    }

    /// Get a user by ID.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user")?;

        Ok(user)
    }

    /// Mark a user as premium. Returns the updated user, or `None` if absent.
    #[instrument(skip(self))]
    pub async fn set_premium(&self, username: &str, premium: bool) -> Result<Option<User>> {
        let result = sqlx::query(
            "UPDATE users SET is_premium = ?, updated_at = datetime('now') WHERE username = ?",
        )
        .bind(premium)
        .bind(username)
        .execute(&self.pool)
        .await
        .context("Failed to update premium flag")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_username(username).await
    }

    /// Delete a user.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete user")?;

        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("User not found: {}", id));
        }

        Ok(())
    }

    /// Count users sharing an email (the schema keeps this at most 1).
    #[instrument(skip(self))]
    pub async fn count_by_email(&self, email: &str) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users by email")?;

        Ok(count.0)
    }
}

#[async_trait]
impl CredentialStore for UserRepository {
    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by username")?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by email")?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn exists_by_username(&self, username: &str) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check username availability")?;

        Ok(count.0 > 0)
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn save(&self, user: NewUser) -> Result<User> {
        let id = Self::generate_id();
        debug!("Creating user: {} ({})", user.username, id);

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .execute(&self.pool)
        .await
        .context("Failed to insert user")?;

        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after creation"))
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn provision_external(&self, user: NewUser) -> Result<Option<User>> {
        let id = Self::generate_id();

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(email) DO NOTHING
            "#,
        )
        .bind(&id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .execute(&self.pool)
        .await
        .context("Failed to provision external user");

        match result {
            Ok(done) if done.rows_affected() > 0 => {
                debug!("Provisioned user {} for external identity", id);
            }
            Ok(_) => {}
            // The username is taken. If a racing provision for the same email
            // took it, the lookup below finds that row; otherwise it is `None`.
            Err(err) if is_unique_violation(&err) => {
                debug!("Username collision while provisioning: {:#}", err);
            }
            Err(err) => return Err(err),
        }

        self.find_by_email(&user.email).await
    }
}
