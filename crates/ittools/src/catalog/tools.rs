//! Tool repository.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use super::models::{NewTool, Tool};

const TOOL_COLUMNS: &str = "id, name, description, category, path, sort_order, enabled, premium";

/// Repository for the tool catalog.
#[derive(Debug, Clone)]
pub struct ToolRepository {
    pool: SqlitePool,
}

impl ToolRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all tools in display order.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Tool>> {
        let sql = format!("SELECT {TOOL_COLUMNS} FROM tools ORDER BY sort_order, name");
        let tools = sqlx::query_as::<_, Tool>(&sql)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list tools")?;

        Ok(tools)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<Tool>> {
        let sql = format!("SELECT {TOOL_COLUMNS} FROM tools WHERE id = ?");
        let tool = sqlx::query_as::<_, Tool>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch tool")?;

        Ok(tool)
    }

    /// Add a tool. Fails with a unique violation if the name is taken.
    #[instrument(skip(self, tool), fields(name = %tool.name))]
    pub async fn create(&self, tool: NewTool) -> Result<Tool> {
        let id = format!("tool_{}", nanoid::nanoid!(12));
        debug!("Creating tool: {} ({})", tool.name, id);

        sqlx::query(
            r#"
            INSERT INTO tools (id, name, description, category, path, sort_order, enabled, premium)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&tool.name)
        .bind(&tool.description)
        .bind(&tool.category)
        .bind(&tool.path)
        .bind(tool.sort_order)
        .bind(tool.enabled)
        .bind(tool.premium)
        .execute(&self.pool)
        .await
        .context("Failed to insert tool")?;

        self.get(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Tool not found after creation"))
    }

    /// Set the enabled flag and, when given, the premium flag.
    /// Returns `None` if the tool does not exist.
    #[instrument(skip(self))]
    pub async fn set_flags(
        &self,
        id: &str,
        enabled: bool,
        premium: Option<bool>,
    ) -> Result<Option<Tool>> {
        let result = sqlx::query(
            "UPDATE tools SET enabled = ?, premium = COALESCE(?, premium) WHERE id = ?",
        )
        .bind(enabled)
        .bind(premium)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update tool")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(id).await
    }

    /// Delete a tool. Returns whether it existed.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tools WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete tool")?;

        Ok(result.rows_affected() > 0)
    }
}
