//! Cheap syntactic checks on raw credentials, run before any store lookup.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

pub const MAX_EMAIL_LENGTH: usize = 320;
pub const MAX_PASSWORD_LENGTH: usize = 1024;

// Shape check only; full RFC 5322 parsing is not the goal.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

pub fn is_valid_email(value: &str) -> bool {
    let len = value.chars().count();
    if len == 0 || len > MAX_EMAIL_LENGTH {
        return false;
    }
    EMAIL_REGEX.is_match(value)
}

pub fn is_valid_password(value: &str) -> bool {
    let len = value.chars().count();
    (1..=MAX_PASSWORD_LENGTH).contains(&len)
}

/// Type-checks an untyped JSON field before validating it as an email.
pub fn is_valid_email_value(value: &Value) -> bool {
    value.as_str().is_some_and(is_valid_email)
}

/// Type-checks an untyped JSON field before validating it as a password.
pub fn is_valid_password_value(value: &Value) -> bool {
    value.as_str().is_some_and(is_valid_password)
}
