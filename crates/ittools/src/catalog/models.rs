//! Tool catalog data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A tool listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    #[serde(rename = "toolId")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Frontend route of the tool.
    pub path: String,
    #[serde(rename = "order")]
    pub sort_order: i64,
    pub enabled: bool,
    /// Only available to premium users.
    pub premium: bool,
}

/// Request to add a tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, rename = "order")]
    pub sort_order: i64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub premium: bool,
}

fn default_enabled() -> bool {
    true
}
