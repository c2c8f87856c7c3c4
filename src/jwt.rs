//! JWT token generation and validation.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::UserRole;

/// Token type for distinguishing access vs refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived access token (1 hour)
    Access,
    /// Long-lived refresh token (7 days), only used to mint a new pair
    Refresh,
}

/// JWT claims shared by both tokens of a pair.
///
/// The identity fields (`id`, `email`, `role`, `username`) and `jti` are the
/// same in the access and refresh token; only `typ` and `exp` differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Database user ID
    pub id: i64,
    pub email: String,
    pub role: UserRole,
    pub username: String,
    /// Token type
    #[serde(rename = "typ")]
    pub token_type: TokenType,
    /// Pair identifier, fresh for every issued pair
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Access token duration: 1 hour
pub const ACCESS_TOKEN_DURATION_SECS: u64 = 60 * 60;

/// Refresh token duration: 7 days
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Configuration for JWT operations.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

/// A freshly signed access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Pair identifier embedded in both tokens
    pub jti: String,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Sign an access token (1 hour) and a refresh token (7 days) over the
    /// same identity claims.
    pub fn issue_pair(
        &self,
        id: i64,
        email: &str,
        role: UserRole,
        username: &str,
    ) -> Result<TokenPair, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| JwtError::TimeError)?
            .as_secs();

        let jti = uuid::Uuid::new_v4().to_string();

        let mut claims = Claims {
            id,
            email: email.to_string(),
            role,
            username: username.to_string(),
            token_type: TokenType::Access,
            jti: jti.clone(),
            iat: now,
            exp: now + ACCESS_TOKEN_DURATION_SECS,
        };
        let access_token = self.sign(&claims)?;

        claims.token_type = TokenType::Refresh;
        claims.exp = now + REFRESH_TOKEN_DURATION_SECS;
        let refresh_token = self.sign(&claims)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            jti,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        jsonwebtoken::encode(&Header::default(), claims, &self.encoding_key)
            .map_err(JwtError::Encoding)
    }

    /// Validate and decode an access token.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate(token, TokenType::Access)
    }

    /// Validate and decode a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate(token, TokenType::Refresh)
    }

    fn validate(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(JwtError::from_decoding)?;

        if token_data.claims.token_type != expected {
            return Err(JwtError::WrongTokenType);
        }

        Ok(token_data.claims)
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    Encoding(jsonwebtoken::errors::Error),
    /// The signature is valid but `exp` has passed
    #[error("Token expired")]
    Expired,
    /// Malformed token, bad signature, or claims that do not decode
    #[error("{0}")]
    Invalid(jsonwebtoken::errors::Error),
    /// Any other verification failure
    #[error("Unexpected verification error: {0}")]
    Unexpected(jsonwebtoken::errors::Error),
    #[error("System time error")]
    TimeError,
    /// Wrong token type (e.g., using refresh token as access token)
    #[error("Wrong token type")]
    WrongTokenType,
}

impl JwtError {
    fn from_decoding(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => JwtError::Invalid(e),
            _ => JwtError::Unexpected(e),
        }
    }
}
