//! Favorite tool handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::auth::CurrentUser;
use crate::user::CredentialStore;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// Request to add a favorite.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    #[serde(default)]
    pub tool_name: Option<String>,
}

/// Favorite mutation response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

/// Resolve the caller's stored id.
async fn user_id(state: &AppState, user: &CurrentUser) -> ApiResult<String> {
    state
        .users
        .find_by_username(user.username())
        .await?
        .map(|u| u.id)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// List the current user's favorite tool names.
#[instrument(skip(state, user), fields(username = %user.username()))]
pub async fn list_favorites(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<String>>> {
    let id = user_id(&state, &user).await?;
    Ok(Json(state.favorites.list(&id).await?))
}

/// Add a tool to the current user's favorites.
#[instrument(skip(state, user, request), fields(username = %user.username()))]
pub async fn add_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<FavoriteRequest>,
) -> ApiResult<(StatusCode, Json<FavoriteResponse>)> {
    let tool_name = request
        .tool_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::bad_request("Tool name is required"))?;

    let id = user_id(&state, &user).await?;
    state.favorites.add(&id, &tool_name).await?;

    Ok((
        StatusCode::CREATED,
        Json(FavoriteResponse {
            message: "Tool added to favorites".to_string(),
            tool_name: Some(tool_name),
        }),
    ))
}

/// Remove a tool from the current user's favorites.
#[instrument(skip(state, user), fields(username = %user.username()))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(tool_name): Path<String>,
) -> ApiResult<Json<FavoriteResponse>> {
    let id = user_id(&state, &user).await?;

    if !state.favorites.remove(&id, &tool_name).await? {
        return Err(ApiError::not_found("Tool not found in favorites"));
    }

    Ok(Json(FavoriteResponse {
        message: "Tool removed from favorites".to_string(),
        tool_name: None,
    }))
}
