//! Error taxonomy of the authentication core.

use thiserror::Error;

use newsroom_core::DomainError;

use crate::password::PasswordError;

/// Message returned for both unknown-email and wrong-password failures.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Identifiants invalides";

/// Message returned when the credentials are valid but the role is too low.
pub const INSUFFICIENT_ROLE_MESSAGE: &str = "Accès non autorisé pour ce rôle";

/// Message shown to callers for any fatal configuration failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Une erreur interne est survenue.";

/// A required secret is absent or unusable.
///
/// Fatal: the process cannot authenticate anyone until configuration is fixed.
/// The `Display` text names the setting but never its value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("{0} is missing")]
    Missing(&'static str),

    #[error("ENCRYPTION_KEY must be 64 hex characters (256 bits)")]
    InvalidEncryptionKey,
}

/// Errors surfaced by [`crate::Authenticator`] and [`crate::TokenService`].
#[derive(Debug, Error)]
pub enum AuthError {
    /// Detailed cause is logged where it is detected; callers only ever see
    /// the generic message.
    #[error("{INTERNAL_ERROR_MESSAGE}")]
    Configuration(#[from] ConfigurationError),

    #[error("{INVALID_CREDENTIALS_MESSAGE}")]
    InvalidCredentials,

    #[error("{INSUFFICIENT_ROLE_MESSAGE}")]
    InsufficientRole,

    #[error("user store unavailable")]
    Store(#[source] DomainError),

    #[error("failed to sign session token")]
    Token(#[source] jsonwebtoken::errors::Error),

    #[error("failed to encrypt token subject")]
    Encryption,

    #[error("token lifetime out of range")]
    TokenLifetime,

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl AuthError {
    /// Whether the failure is the caller's fault (bad credentials or role) as
    /// opposed to a server-side problem.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AuthError::InvalidCredentials | AuthError::InsufficientRole)
    }
}
