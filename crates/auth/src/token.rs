//! Signed, time-limited session tokens whose subject is the encrypted user id.

use core::fmt;
use core::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use thiserror::Error;

use newsroom_core::UserId;

use crate::cipher::IdentifierCipher;
use crate::claims::{SessionClaims, TokenRejection, validate_claims};
use crate::error::{AuthError, ConfigurationError};
use crate::roles::Role;
use crate::secrets::SecretProvider;

/// Default session lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Longest accepted session lifetime.
pub const MAX_TTL: Duration = Duration::from_secs(366 * 24 * 60 * 60);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidTtl {
    #[error("invalid duration: {0}")]
    Parse(String),

    #[error("duration exceeds one year")]
    TooLong,
}

/// Session lifetime. Parses human durations such as `24h`, `30m`, `1ms` or
/// `7days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTtl(Duration);

impl TokenTtl {
    pub fn new(duration: Duration) -> Result<Self, InvalidTtl> {
        if duration > MAX_TTL {
            return Err(InvalidTtl::TooLong);
        }
        Ok(Self(duration))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl Default for TokenTtl {
    fn default() -> Self {
        Self(DEFAULT_TTL)
    }
}

impl FromStr for TokenTtl {
    type Err = InvalidTtl;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let duration =
            humantime::parse_duration(s.trim()).map_err(|e| InvalidTtl::Parse(e.to_string()))?;
        Self::new(duration)
    }
}

impl fmt::Display for TokenTtl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", humantime::format_duration(self.0))
    }
}

/// Per-token overrides.
#[derive(Debug, Clone, Default)]
pub struct TokenOptions {
    pub role: Option<Role>,
    pub ttl: TokenTtl,
}

/// Issues and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    cipher: IdentifierCipher,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Resolve both secrets once. Missing or unusable secrets are fatal.
    pub fn new(secrets: &dyn SecretProvider) -> Result<Self, ConfigurationError> {
        let signing_secret = secrets.signing_secret()?;
        let cipher = IdentifierCipher::new(&secrets.encryption_key()?).inspect_err(|e| {
            tracing::error!(error = %e, "critical: encryption key is unusable");
        })?;

        let secret = signing_secret.expose_secret().as_bytes();

        // Expiry is checked by `validate_claims` so every time-window failure
        // is classified the same way, with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            cipher,
        })
    }

    /// The cipher bound to the same key the subjects were encrypted with.
    pub fn cipher(&self) -> &IdentifierCipher {
        &self.cipher
    }

    /// Issue a token valid for 24 hours.
    pub fn create_token(&self, user_id: &UserId) -> Result<String, AuthError> {
        self.create_token_with(user_id, TokenOptions::default())
    }

    pub fn create_token_with(
        &self,
        user_id: &UserId,
        options: TokenOptions,
    ) -> Result<String, AuthError> {
        let subject = self
            .cipher
            .encrypt(&user_id.to_string())
            .map_err(|_| AuthError::Encryption)?;

        let iat = Utc::now();
        let exp = expiry(iat, options.ttl).ok_or(AuthError::TokenLifetime)?;

        self.encode_claims(&SessionClaims {
            sub: subject.to_string(),
            iat,
            exp,
            role: options.role,
        })
    }

    /// Sign arbitrary claims with the service key.
    pub fn encode_claims(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(AuthError::Token)
    }

    /// Verify signature and time window. Failures are logged by category only.
    pub fn verify_token(&self, token: &str) -> Option<SessionClaims> {
        match self.decode(token) {
            Ok(claims) => Some(claims),
            Err(rejection) => {
                tracing::warn!(reason = rejection.as_str(), "session token rejected");
                None
            }
        }
    }

    pub fn decode(&self, token: &str) -> Result<SessionClaims, TokenRejection> {
        self.decode_at(token, Utc::now())
    }

    /// Same as [`Self::decode`] against an explicit clock.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenRejection> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenRejection::InvalidSignature,
                _ => TokenRejection::Malformed,
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

fn expiry(iat: DateTime<Utc>, ttl: TokenTtl) -> Option<DateTime<Utc>> {
    let delta = TimeDelta::from_std(ttl.as_duration()).ok()?;
    iat.checked_add_signed(delta)
}
