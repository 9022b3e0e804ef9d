//! JWT claims.

use serde::{Deserialize, Serialize};

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the principal's username).
    pub sub: String,

    /// Granted authorities, e.g. `ROLE_USER`.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Issued at (Unix timestamp, seconds).
    pub iat: i64,

    /// Expiration time (Unix timestamp, seconds).
    pub exp: i64,

    /// Token identifier, unique per issued token.
    #[serde(default)]
    pub jti: String,
}
