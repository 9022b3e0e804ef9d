//! Session establishment filter.

use axum::{
    extract::{Request, State},
    http::{Method, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

use super::context::SecurityContext;
use super::error::AuthError;
use super::token::TokenCodec;

/// Routes that never inspect a token.
const PUBLIC_PATHS: &[&str] = &["/auth/login", "/auth/register"];

/// Extract a Bearer token from an Authorization header value.
fn bearer_token_from_header(header_value: &str) -> Option<&str> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next()?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    Some(token)
}

fn is_public(req: &Request) -> bool {
    req.method() == Method::OPTIONS
        || PUBLIC_PATHS
            .iter()
            .any(|prefix| req.uri().path().starts_with(prefix))
}

/// Authentication state shared with the session filter.
#[derive(Clone, Debug)]
pub struct AuthState {
    codec: Arc<TokenCodec>,
}

impl AuthState {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &Arc<TokenCodec> {
        &self.codec
    }
}

/// Session establishment filter.
///
/// Runs once per request before any handler:
/// 1. Public routes and CORS pre-flight pass straight through.
/// 2. A request without a `Bearer` credential continues anonymously.
/// 3. An expired token is answered with 401 immediately.
/// 4. A malformed token is logged and the request continues anonymously.
/// 5. A valid token binds a [`SecurityContext`] into the request extensions.
///
/// Whether an anonymous request may reach a handler is decided by the
/// handler's extractors (`CurrentUser`, `RequireAdmin`).
pub async fn session_filter(State(auth): State<AuthState>, mut req: Request, next: Next) -> Response {
    if is_public(&req) {
        return next.run(req).await;
    }

    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token_from_header)
        .map(str::to_owned);

    let Some(token) = token else {
        return next.run(req).await;
    };

    match auth.codec.verify(&token) {
        Ok(claims) => {
            let context = SecurityContext::from(claims);
            debug!(subject = %context.subject(), "Security context established");
            req.extensions_mut().insert(context);
        }
        Err(AuthError::ExpiredToken) => {
            debug!(path = %req.uri().path(), "Rejecting expired token");
            return AuthError::ExpiredToken.into_response();
        }
        Err(err) => {
            debug!(path = %req.uri().path(), error = %err, "Ignoring unusable token");
        }
    }

    next.run(req).await
}
