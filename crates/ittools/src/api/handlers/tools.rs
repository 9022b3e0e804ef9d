//! Tool catalog handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::auth::{CurrentUser, RequireAdmin};
use crate::catalog::{NewTool, Tool};
use crate::user::is_unique_violation;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// Query for toggling a tool.
#[derive(Debug, Deserialize)]
pub struct ToggleQuery {
    pub enabled: bool,
    #[serde(default)]
    pub premium: Option<bool>,
}

/// List all tools.
#[instrument(skip(state, _user))]
pub async fn list_tools(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<Tool>>> {
    Ok(Json(state.tools.list().await?))
}

/// Add a tool (admin only).
#[instrument(skip(state, admin, request), fields(name = %request.name))]
pub async fn create_tool(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<NewTool>,
) -> ApiResult<(StatusCode, Json<Tool>)> {
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Tool name is required"));
    }

    let tool = state.tools.create(request).await.map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::conflict("Tool name already exists")
        } else {
            ApiError::from(e)
        }
    })?;

    info!(tool_id = %tool.id, admin = %admin.username(), "Added tool");
    Ok((StatusCode::CREATED, Json(tool)))
}

/// Enable/disable a tool and optionally change its premium flag (admin only).
#[instrument(skip(state, _admin))]
pub async fn toggle_tool(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
    Query(query): Query<ToggleQuery>,
) -> ApiResult<Json<Tool>> {
    let tool = state
        .tools
        .set_flags(&id, query.enabled, query.premium)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Tool not found: {}", id)))?;

    Ok(Json(tool))
}

/// Delete a tool (admin only).
#[instrument(skip(state, _admin))]
pub async fn delete_tool(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !state.tools.delete(&id).await? {
        return Err(ApiError::not_found(format!("Tool not found: {}", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
