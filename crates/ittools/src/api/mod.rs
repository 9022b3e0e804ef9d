//! HTTP API module.
//!
//! REST endpoints for authentication, the current user, the tool catalog
//! and favorites.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse, INVALID_LOGIN};
pub use handlers::{HealthResponse, LoginResponse};
pub use routes::create_router;
pub use state::AppState;
