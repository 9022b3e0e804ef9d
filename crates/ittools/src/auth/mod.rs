//! Authentication module.
//!
//! Provides stateless bearer-token authentication:
//! - HS256 session tokens (`TokenCodec`)
//! - A per-request session filter that binds a `SecurityContext`
//! - Local username/password registration and login
//! - GitHub sign-in via the OAuth authorization-code flow

mod claims;
mod config;
mod context;
mod error;
mod local;
mod middleware;
pub mod oauth;
mod token;

pub use claims::Claims;
pub use config::{AuthConfig, ConfigValidationError, GithubConfig};
pub use context::{ADMIN_AUTHORITY, CurrentUser, RequireAdmin, SecurityContext};
pub use error::AuthError;
pub use local::{LocalAuthService, Registration};
pub use middleware::{AuthState, session_filter};
pub use oauth::{ExternalIdentityExchange, GithubProvider, IdentityProvider};
pub use token::TokenCodec;
