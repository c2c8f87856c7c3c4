//! JWT authentication with role-based access control.
//!
//! Dual-token system: short-lived access tokens (1 hour) and long-lived
//! refresh tokens (7 days), both stateless and carried in HTTP-only cookies.
//! Only the access token authenticates a request; the refresh token is
//! exchanged for a new pair at the refresh endpoint.

mod cookie;
mod errors;
mod extractors;
mod state;
mod types;

pub use cookie::{
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, access_cookie, clear_cookie, get_cookie,
    refresh_cookie,
};
pub use errors::{ApiAuthError, AuthErrorKind};
pub use extractors::{AnyRole, Auth, RoleConstraint, TeacherOnly};
pub use state::HasAuthBackend;
pub use types::AuthenticatedUser;
