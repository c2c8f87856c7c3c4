//! Session endpoints.
//!
//! - POST `/register` - Create a user and log them in
//! - POST `/login` - Exchange username/email + password for a token pair
//! - POST `/logout` - Clear both session cookies
//! - GET `/refresh-token` - Exchange the refresh cookie for a new token pair
//! - GET `/protected` - Check that the access cookie is valid

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use crate::auth::{
    ACCESS_COOKIE_NAME, Auth, HasAuthBackend, REFRESH_COOKIE_NAME, access_cookie, clear_cookie,
    get_cookie, refresh_cookie,
};
use crate::db::{Database, NewUser, User, UserRole, is_unique_violation};
use crate::impl_has_auth_backend;
use crate::jwt::{JwtConfig, JwtError};
use crate::password::{hash_password, verify_password};

#[derive(Clone)]
pub struct SessionState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub secure_cookies: bool,
}

impl_has_auth_backend!(SessionState);

pub fn router(state: SessionState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh-token", get(refresh_token))
        .route("/protected", get(protected))
        .with_state(state)
}

// --- Request/Response types ---

#[derive(Deserialize)]
struct RegisterRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    confirm_password: String,
    role: Option<UserRole>,
    first_name: Option<String>,
    last_name_1: Option<String>,
    last_name_2: Option<String>,
    phone: Option<String>,
}

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    login: String,
    #[serde(default)]
    password: String,
}

/// Public view of a user. Never carries the password hash.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub first_name: Option<String>,
    pub last_name_1: Option<String>,
    pub last_name_2: Option<String>,
    pub phone: Option<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            first_name: user.first_name,
            last_name_1: user.last_name_1,
            last_name_2: user.last_name_2,
            phone: user.phone,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
struct SessionResponse {
    user: UserResponse,
    token: String,
    #[serde(rename = "refreshToken")]
    refresh_token: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

type SessionCookies = AppendHeaders<[(axum::http::HeaderName, String); 2]>;

// --- Helpers ---

/// Loose email shape check: `local@domain.tld` with no whitespace and a single `@`.
/// Decides whether a login identifier is looked up as an email or a username.
fn is_email_shaped(login: &str) -> bool {
    if login.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = login.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .match_indices('.')
        .any(|(i, _)| i > 0 && i + 1 < domain.len())
}

fn validate_register(payload: &RegisterRequest) -> Result<(), ApiError> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::bad_request("Username cannot be empty"));
    }
    if payload.email.trim().is_empty() {
        return Err(ApiError::bad_request("Email cannot be empty"));
    }
    if payload.password.trim().is_empty() {
        return Err(ApiError::bad_request("Password cannot be empty"));
    }
    if payload.password != payload.confirm_password {
        return Err(ApiError::bad_request("Password confirmation does not match"));
    }
    Ok(())
}

fn validate_login(payload: &LoginRequest) -> Result<(), ApiError> {
    if payload.login.trim().is_empty() {
        return Err(ApiError::bad_request("Login identifier cannot be empty"));
    }
    if payload.password.trim().is_empty() {
        return Err(ApiError::bad_request("Password cannot be empty"));
    }
    Ok(())
}

/// Issue a fresh token pair for `user` and build both session cookies.
fn start_session<S: HasAuthBackend>(
    state: &S,
    user: User,
) -> Result<(SessionCookies, SessionResponse), ApiError> {
    let pair = state
        .jwt()
        .issue_pair(user.id, &user.email, user.role, &user.username)
        .internal_err("Failed to generate token")?;

    let secure = state.secure_cookies();
    let cookies = AppendHeaders([
        (SET_COOKIE, access_cookie(&pair.access_token, secure)),
        (SET_COOKIE, refresh_cookie(&pair.refresh_token, secure)),
    ]);

    tracing::debug!(user_id = user.id, jti = %pair.jti, "Session started");

    Ok((
        cookies,
        SessionResponse {
            user: UserResponse::from(user),
            token: pair.access_token,
            refresh_token: pair.refresh_token,
        },
    ))
}

// --- Handlers ---

async fn register(
    State(state): State<SessionState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    validate_register(&payload)?;

    let username = payload.username.trim();
    let email = payload.email.trim().to_lowercase();

    let existing = state
        .db
        .users()
        .find_by_email_or_username(&email, username)
        .await
        .db_err("Failed to check existing users")?;

    if existing.is_some() {
        return Err(ApiError::conflict("Username or email already in use"));
    }

    let password_hash = hash_password(payload.password.clone())
        .await
        .internal_err("Failed to hash password")?;

    let new_user = NewUser {
        username,
        email: &email,
        password_hash: &password_hash,
        role: payload.role.unwrap_or(UserRole::Student),
        first_name: payload.first_name.as_deref(),
        last_name_1: payload.last_name_1.as_deref(),
        last_name_2: payload.last_name_2.as_deref(),
        phone: payload.phone.as_deref(),
    };

    let id = state.db.users().create(&new_user).await.map_err(|e| {
        // Lost a race with a concurrent registration
        if is_unique_violation(&e) {
            ApiError::conflict("Username or email already in use")
        } else {
            ApiError::db_error("Failed to create user", e)
        }
    })?;

    let user = state
        .db
        .users()
        .get_by_id(id)
        .await
        .db_err("Failed to get created user")?
        .ok_or_else(|| ApiError::internal("Created user not found"))?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    let (cookies, body) = start_session(&state, user)?;
    Ok((StatusCode::CREATED, cookies, Json(body)))
}

async fn login(
    State(state): State<SessionState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    validate_login(&payload)?;

    let login = payload.login.trim();
    let lookup = if is_email_shaped(login) {
        state.db.users().get_by_email(&login.to_lowercase()).await
    } else {
        state.db.users().get_by_username(login).await
    };

    let user = lookup
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("No user found with that username or email"))?;

    let valid = verify_password(payload.password, user.password_hash.clone())
        .await
        .internal_err("Failed to verify password")?;

    if !valid {
        return Err(ApiError::unauthorized("Incorrect password"));
    }

    let (cookies, body) = start_session(&state, user)?;
    Ok((StatusCode::OK, cookies, Json(body)))
}

/// Logout - clear both cookies. Tokens stay valid until they expire.
async fn logout(State(state): State<SessionState>) -> impl IntoResponse {
    let secure = state.secure_cookies;
    (
        StatusCode::OK,
        AppendHeaders([
            (SET_COOKIE, clear_cookie(ACCESS_COOKIE_NAME, secure)),
            (SET_COOKIE, clear_cookie(REFRESH_COOKIE_NAME, secure)),
        ]),
        Json(MessageResponse {
            message: "Cookies cleared".to_string(),
        }),
    )
}

/// Rotate the session: a valid refresh cookie buys a brand new token pair
/// built from the current user record.
async fn refresh_token(
    State(state): State<SessionState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = get_cookie(&headers, REFRESH_COOKIE_NAME)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing refresh token"))?;

    let claims = state
        .jwt
        .validate_refresh_token(refresh_token)
        .map_err(|e| match e {
            JwtError::Expired => ApiError::unauthorized("Refresh token expired"),
            _ => ApiError::unauthorized("Authentication denied"),
        })?;

    let user = state
        .db
        .users()
        .get_by_id(claims.id)
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::unauthorized("Authentication denied"))?;

    let (cookies, body) = start_session(&state, user)?;
    Ok((StatusCode::OK, cookies, Json(body)))
}

async fn protected(auth: Auth) -> impl IntoResponse {
    Json(MessageResponse {
        message: format!("Authenticated as {}", auth.user.username),
    })
}
