//! `newsroom-auth`: authentication core of the newsroom backend.
//!
//! Credential checks, role hierarchy, session token issuance and session
//! resolution. Decoupled from HTTP; storage is reached through [`UserStore`].

pub mod authenticator;
pub mod cipher;
pub mod claims;
pub mod error;
pub mod password;
pub mod roles;
pub mod secrets;
pub mod session;
pub mod store;
pub mod token;
pub mod user;
pub mod validation;

pub use authenticator::Authenticator;
pub use cipher::{DecryptionError, EncryptedId, IdentifierCipher};
pub use claims::{SessionClaims, TokenRejection, validate_claims};
pub use error::{
    AuthError, ConfigurationError, INSUFFICIENT_ROLE_MESSAGE, INTERNAL_ERROR_MESSAGE,
    INVALID_CREDENTIALS_MESSAGE,
};
pub use password::{PasswordConfig, PasswordError, PasswordHasher};
pub use roles::{Role, UnknownRole};
pub use secrets::{
    LayeredSecrets, SecretProvider, SecretsConfig, StaticSecrets, generate_encryption_key,
    generate_signing_secret,
};
pub use session::{AuthResult, Rejection, SessionResolver};
pub use store::{InMemoryUserStore, UserStore};
pub use token::{TokenOptions, TokenService, TokenTtl};
pub use user::{NewUser, User, UserSummary};
pub use validation::{is_valid_email, is_valid_password};
