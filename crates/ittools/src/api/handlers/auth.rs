//! Authentication handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::auth::Registration;
use crate::user::UserRole;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// `USER`, `ADMIN` or their `ROLE_` forms. Defaults to `USER`.
    #[serde(default)]
    pub role: Option<String>,
}

/// GitHub redirect query.
#[derive(Debug, Deserialize)]
pub struct GithubCallbackQuery {
    #[serde(default)]
    pub code: Option<String>,
}

/// Exchange username and password for a session token.
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let token = state
        .local_auth
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse { token }))
}

/// Register a local user.
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let role = match request.role.as_deref() {
        None | Some("") => UserRole::default(),
        Some(raw) => raw.parse::<UserRole>().map_err(ApiError::bad_request)?,
    };

    state
        .local_auth
        .register(Registration {
            username: request.username,
            email: request.email,
            password: request.password,
            role,
        })
        .await?;

    Ok((StatusCode::CREATED, "User registered successfully"))
}

/// GitHub OAuth callback: sign in and redirect to the frontend with a token.
#[instrument(skip_all)]
pub async fn github_callback(
    State(state): State<AppState>,
    Query(query): Query<GithubCallbackQuery>,
) -> ApiResult<Response> {
    let location = state
        .oauth
        .complete(query.code.as_deref().unwrap_or_default())
        .await?;

    Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
}
