//! Authentication user types.

use crate::db::UserRole;
use crate::jwt::Claims;

/// Authenticated user information extracted from a verified access token.
/// Lives for one request only and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Database user ID
    pub id: i64,
    pub email: String,
    pub role: UserRole,
    pub username: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            email: claims.email,
            role: claims.role,
            username: claims.username,
        }
    }
}
