//! Session cookie handling (`auth_token`) with bearer-header fallback.

use axum::http::header::{AUTHORIZATION, COOKIE, InvalidHeaderValue};
use axum::http::{HeaderMap, HeaderValue};

pub const SESSION_COOKIE_NAME: &str = "auth_token";

/// Matches the default token lifetime.
pub const SESSION_MAX_AGE_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, Default)]
pub struct CookieSettings {
    /// Only set when served over HTTPS (production).
    pub secure: bool,
}

impl CookieSettings {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    pub fn session_cookie(&self, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        self.build(token, SESSION_MAX_AGE_SECS)
    }

    pub fn clear_session_cookie(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        self.build("", 0)
    }

    fn build(&self, value: &str, max_age: u64) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={value}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age}"
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

/// Session cookie first, then `Authorization: Bearer`.
pub fn extract_session_token(headers: &HeaderMap) -> Option<&str> {
    extract_cookie_token(headers).or_else(|| extract_bearer_token(headers))
}

fn extract_cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == SESSION_COOKIE_NAME)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
