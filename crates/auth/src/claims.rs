use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Role;

/// Session token claims.
///
/// `sub` is the `iv:ciphertext` encryption of the user id, never the raw id.
/// Timestamps travel as numeric seconds since the epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Why a presented token was refused. Only the category is ever logged.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    #[error("malformed")]
    Malformed,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("expired")]
    Expired,

    #[error("not yet valid")]
    NotYetValid,

    #[error("invalid time window")]
    InvalidTimeWindow,
}

impl TokenRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenRejection::Malformed => "malformed",
            TokenRejection::InvalidSignature => "invalid signature",
            TokenRejection::Expired => "expired",
            TokenRejection::NotYetValid => "not yet valid",
            TokenRejection::InvalidTimeWindow => "invalid time window",
        }
    }
}

/// Deterministically validate the time window of already-verified claims.
///
/// A token is expired once `now >= exp`. `exp == iat` is a legal (zero
/// length) window, which is what sub-second lifetimes truncate to.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenRejection> {
    if claims.exp < claims.iat {
        return Err(TokenRejection::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenRejection::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenRejection::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn claims(iat_offset: i64, exp_offset: i64) -> (SessionClaims, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        (
            SessionClaims {
                sub: "00:00".to_string(),
                iat: now + Duration::seconds(iat_offset),
                exp: now + Duration::seconds(exp_offset),
                role: None,
            },
            now,
        )
    }

    #[test]
    fn accepts_a_live_window() {
        let (c, now) = claims(-10, 10);
        assert_eq!(validate_claims(&c, now), Ok(()));
    }

    #[test]
    fn expiry_is_inclusive() {
        let (c, now) = claims(-10, 0);
        assert_eq!(validate_claims(&c, now), Err(TokenRejection::Expired));
    }

    #[test]
    fn zero_length_window_is_expired_not_malformed() {
        let (c, now) = claims(0, 0);
        assert_eq!(validate_claims(&c, now), Err(TokenRejection::Expired));
    }

    #[test]
    fn future_issue_time_is_not_yet_valid() {
        let (c, now) = claims(5, 60);
        assert_eq!(validate_claims(&c, now), Err(TokenRejection::NotYetValid));
    }

    #[test]
    fn inverted_window_is_rejected_first() {
        let (c, now) = claims(60, 5);
        assert_eq!(validate_claims(&c, now), Err(TokenRejection::InvalidTimeWindow));
    }

    #[test]
    fn timestamps_serialize_as_seconds_and_role_is_optional() {
        let (c, _) = claims(0, 3600);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["exp"].as_i64().unwrap() - json["iat"].as_i64().unwrap(), 3600);
        assert!(json.get("role").is_none());

        let with_role = SessionClaims { role: Some(Role::Editor), ..c };
        assert_eq!(serde_json::to_value(&with_role).unwrap()["role"], "editor");
    }

    #[test]
    fn rejection_labels() {
        assert_eq!(TokenRejection::InvalidSignature.as_str(), "invalid signature");
        assert_eq!(TokenRejection::NotYetValid.to_string(), "not yet valid");
    }
}
