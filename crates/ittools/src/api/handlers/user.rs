//! Current-user handlers.

use axum::{Json, extract::State};
use tracing::{info, instrument};

use crate::auth::CurrentUser;
use crate::user::{CredentialStore, UserInfo};

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// Get the current user's profile.
#[instrument(skip(state, user), fields(username = %user.username()))]
pub async fn get_profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<UserInfo>> {
    let record = state
        .users
        .find_by_username(user.username())
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(record.into()))
}

/// Mark the current user as premium.
#[instrument(skip(state, user), fields(username = %user.username()))]
pub async fn upgrade_to_premium(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<UserInfo>> {
    let record = state
        .users
        .set_premium(user.username(), true)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!(user_id = %record.id, "Upgraded user to premium");
    Ok(Json(record.into()))
}
