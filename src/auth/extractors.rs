//! Axum extractors for authentication and role-based authorization.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::cookie::{ACCESS_COOKIE_NAME, get_cookie};
use super::errors::{ApiAuthError, AuthErrorKind};
use super::state::HasAuthBackend;
use super::types::AuthenticatedUser;
use crate::db::UserRole;

/// The set of roles an endpoint accepts.
pub trait RoleConstraint {
    /// Accepted roles, or `None` to accept any authenticated user.
    fn allowed_roles() -> Option<&'static [UserRole]>;

    fn allows(role: UserRole) -> bool {
        Self::allowed_roles().is_none_or(|roles| roles.contains(&role))
    }
}

/// Any authenticated user.
pub struct AnyRole;

impl RoleConstraint for AnyRole {
    fn allowed_roles() -> Option<&'static [UserRole]> {
        None
    }
}

/// Only users with the Teacher role.
pub struct TeacherOnly;

impl RoleConstraint for TeacherOnly {
    fn allowed_roles() -> Option<&'static [UserRole]> {
        Some(&[UserRole::Teacher])
    }
}

/// Verify the access token cookie and build the request's user context.
fn authenticate_request<S>(parts: &Parts, state: &S) -> Result<AuthenticatedUser, ApiAuthError>
where
    S: HasAuthBackend,
{
    let access_token = get_cookie(&parts.headers, ACCESS_COOKIE_NAME)
        .ok_or_else(|| ApiAuthError::new(AuthErrorKind::NotAuthenticated))?;

    let claims = state.jwt().validate_access_token(access_token)?;

    Ok(AuthenticatedUser::from(claims))
}

/// Extractor for endpoints that require authentication.
///
/// Validates the access token (stateless, no database lookup), then checks the
/// user's role against `R`. Both failures reject with 401.
pub struct Auth<R: RoleConstraint = AnyRole> {
    pub user: AuthenticatedUser,
    _role: PhantomData<R>,
}

impl<S, R> FromRequestParts<S> for Auth<R>
where
    S: HasAuthBackend + Send + Sync,
    R: RoleConstraint,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticate_request(parts, state)?;

        if !R::allows(user.role) {
            return Err(ApiAuthError::new(AuthErrorKind::InsufficientRole));
        }

        Ok(Auth {
            user,
            _role: PhantomData,
        })
    }
}
