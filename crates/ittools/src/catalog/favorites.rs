//! Per-user favorite tools.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::instrument;

/// Repository for favorites, keyed by user id and tool name.
#[derive(Debug, Clone)]
pub struct FavoriteRepository {
    pool: SqlitePool,
}

impl FavoriteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Tool names the user has favorited, oldest first.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT tool_name FROM favorites WHERE user_id = ? ORDER BY created_at, tool_name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list favorites")?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Add a favorite. Adding one that already exists is a no-op.
    #[instrument(skip(self))]
    pub async fn add(&self, user_id: &str, tool_name: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO favorites (user_id, tool_name) VALUES (?, ?)")
            .bind(user_id)
            .bind(tool_name)
            .execute(&self.pool)
            .await
            .context("Failed to add favorite")?;

        Ok(())
    }

    /// Remove a favorite. Returns whether it existed.
    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: &str, tool_name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND tool_name = ?")
            .bind(user_id)
            .bind(tool_name)
            .execute(&self.pool)
            .await
            .context("Failed to remove favorite")?;

        Ok(result.rows_affected() > 0)
    }
}
