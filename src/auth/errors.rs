//! Authentication error types.
//!
//! Every rejection is a 401: a missing token, a token that fails verification,
//! and a role outside the accepted set are indistinguishable by status and
//! differ only in the message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::jwt::JwtError;

/// Why a request was rejected by the auth extractor.
#[derive(Debug)]
pub enum AuthErrorKind {
    /// No access token cookie
    NotAuthenticated,
    TokenExpired,
    /// Structurally or cryptographically invalid token
    InvalidToken(String),
    /// Any other failure while verifying the token
    VerificationFailed,
    InsufficientRole,
}

/// API authentication errors (returns JSON `{message}`).
#[derive(Debug)]
pub struct ApiAuthError {
    pub(super) kind: AuthErrorKind,
}

impl ApiAuthError {
    pub(super) fn new(kind: AuthErrorKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> &AuthErrorKind {
        &self.kind
    }

    pub fn message(&self) -> String {
        match &self.kind {
            AuthErrorKind::NotAuthenticated => "Authentication failed".to_string(),
            AuthErrorKind::TokenExpired => "Authentication failed: token expired".to_string(),
            AuthErrorKind::InvalidToken(reason) => format!("Authentication failed: {}", reason),
            AuthErrorKind::VerificationFailed => {
                "Authentication failed due to an unexpected error while verifying the token"
                    .to_string()
            }
            AuthErrorKind::InsufficientRole => "Insufficient permissions".to_string(),
        }
    }
}

impl From<JwtError> for ApiAuthError {
    fn from(e: JwtError) -> Self {
        let kind = match e {
            JwtError::Expired => AuthErrorKind::TokenExpired,
            JwtError::Invalid(inner) => AuthErrorKind::InvalidToken(inner.to_string()),
            JwtError::WrongTokenType => {
                AuthErrorKind::InvalidToken("wrong token type".to_string())
            }
            other => {
                tracing::error!(error = %other, "Unexpected error during token verification");
                AuthErrorKind::VerificationFailed
            }
        };
        Self::new(kind)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        let message = self.message();
        tracing::warn!(reason = %message, "Rejected request");
        (StatusCode::UNAUTHORIZED, Json(ErrorResponse { message })).into_response()
    }
}
