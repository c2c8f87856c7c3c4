//! Cookie parsing and `Set-Cookie` construction for the session tokens.
//!
//! The two cookies are the whole session: there is no server-side store.

use axum::http::header;

use crate::jwt::{ACCESS_TOKEN_DURATION_SECS, REFRESH_TOKEN_DURATION_SECS};

/// Cookie name for the access token (short-lived, 1 hour).
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie name for the refresh token (long-lived, 7 days).
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// Security attributes shared by both session cookies.
/// Secure deployments need `SameSite=None` so a frontend on another origin
/// still sends the cookies; otherwise the cookies stay same-site only.
fn security_attributes(secure: bool) -> &'static str {
    if secure {
        "HttpOnly; Secure; SameSite=None; Path=/"
    } else {
        "HttpOnly; SameSite=Strict; Path=/"
    }
}

fn build_cookie(name: &str, value: &str, max_age: u64, secure: bool) -> String {
    format!(
        "{}={}; {}; Max-Age={}",
        name,
        value,
        security_attributes(secure),
        max_age
    )
}

/// `Set-Cookie` value carrying the access token.
pub fn access_cookie(token: &str, secure: bool) -> String {
    build_cookie(ACCESS_COOKIE_NAME, token, ACCESS_TOKEN_DURATION_SECS, secure)
}

/// `Set-Cookie` value carrying the refresh token.
pub fn refresh_cookie(token: &str, secure: bool) -> String {
    build_cookie(
        REFRESH_COOKIE_NAME,
        token,
        REFRESH_TOKEN_DURATION_SECS,
        secure,
    )
}

/// `Set-Cookie` value that removes the named cookie.
pub fn clear_cookie(name: &str, secure: bool) -> String {
    build_cookie(name, "", 0, secure)
}
